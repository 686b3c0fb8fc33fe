//! Git worktree lifecycle for isolated per-session working directories.
//!
//! A session that wants to make filesystem changes without touching the
//! caller's checkout acquires an isolated worktree rooted at the
//! session's base commit, commits snapshots into it as it works, and
//! either merges those commits back onto the source branch or discards
//! them on release. Everything is pure-Rust via `gix` — no shelling out
//! to the `git` binary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Errors from worktree acquisition, commit, or merge operations.
#[derive(Debug, Error)]
pub enum WorktreeError {
    #[error("failed to open repository at {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    #[error("filesystem operation failed: {0}")]
    Filesystem(String),
    #[error("git object operation failed: {0}")]
    Object(String),
    #[error("worktree directory already exists: {0}")]
    AlreadyAcquired(PathBuf),
    #[error("no such worktree: {0}")]
    NotFound(PathBuf),
    #[error("merge target {target} is not a fast-forward of base {base}")]
    NotFastForward { base: String, target: String },
}

type Result<T> = std::result::Result<T, WorktreeError>;

/// A checked-out, isolated working directory tied to a session.
pub struct WorktreeHandle {
    /// Directory the session should treat as its working tree root.
    pub path: PathBuf,
    /// Commit the worktree was checked out from.
    pub base_commit: gix::ObjectId,
    source_repo: PathBuf,
}

/// Manages acquire/commit/release/merge for session-scoped worktrees.
///
/// Worktrees are materialized under `<source repo>/.tron/worktrees/<session_id>`
/// as plain directories checked out from a commit's tree — not registered as
/// git-native linked worktrees, so the source repo's own working directory is
/// never touched.
pub struct WorktreeManager {
    source_repo: PathBuf,
}

impl WorktreeManager {
    #[must_use]
    pub fn new(source_repo: impl Into<PathBuf>) -> Self {
        Self {
            source_repo: source_repo.into(),
        }
    }

    fn open(&self) -> Result<gix::Repository> {
        gix::open(&self.source_repo).map_err(|e| WorktreeError::Open {
            path: self.source_repo.clone(),
            source: Box::new(e),
        })
    }

    fn worktrees_root(&self) -> PathBuf {
        self.source_repo.join(".tron").join("worktrees")
    }

    /// Check out HEAD (or an explicit commit) into a fresh directory for `session_id`.
    pub fn acquire(&self, session_id: &str, at_commit: Option<gix::ObjectId>) -> Result<WorktreeHandle> {
        let repo = self.open()?;
        let dest = self.worktrees_root().join(session_id);
        if dest.exists() {
            return Err(WorktreeError::AlreadyAcquired(dest));
        }

        let commit = match at_commit {
            Some(id) => repo
                .find_commit(id)
                .map_err(|e| WorktreeError::Object(format!("find_commit {id}: {e}")))?,
            None => repo
                .head_commit()
                .map_err(|e| WorktreeError::Object(format!("head_commit: {e}")))?,
        };
        let tree = commit
            .tree()
            .map_err(|e| WorktreeError::Object(format!("commit.tree: {e}")))?;

        fs::create_dir_all(&dest)
            .map_err(|e| WorktreeError::Filesystem(format!("create {}: {e}", dest.display())))?;
        checkout_tree(&repo, &tree, &dest)?;

        Ok(WorktreeHandle {
            path: dest,
            base_commit: commit.id().detach(),
            source_repo: self.source_repo.clone(),
        })
    }

    /// Snapshot the current contents of the worktree into a new commit on top
    /// of its current tip (initially `base_commit`). Returns the new commit id.
    pub fn commit(&self, handle: &mut WorktreeHandle, message: &str) -> Result<gix::ObjectId> {
        let repo = self.open()?;
        let entries = collect_entries(&repo, &handle.path)?;
        let tree_id = build_tree_from_entries(&repo, &entries)?;

        let parent = handle.base_commit;
        let commit_id = repo
            .commit_as(
                repo.committer()
                    .transpose()
                    .map_err(|e| WorktreeError::Object(format!("committer identity: {e}")))?
                    .unwrap_or_else(default_signature),
                repo.author()
                    .transpose()
                    .map_err(|e| WorktreeError::Object(format!("author identity: {e}")))?
                    .unwrap_or_else(default_signature),
                format!("refs/tron/worktrees/{}", session_name(&handle.path)),
                message,
                tree_id,
                [parent],
            )
            .map_err(|e| WorktreeError::Object(format!("commit: {e}")))?
            .detach();

        handle.base_commit = commit_id;
        Ok(commit_id)
    }

    /// Remove the worktree directory. Uncommitted changes are discarded.
    pub fn release(&self, handle: WorktreeHandle) -> Result<()> {
        if !handle.path.exists() {
            return Err(WorktreeError::NotFound(handle.path));
        }
        fs::remove_dir_all(&handle.path)
            .map_err(|e| WorktreeError::Filesystem(format!("remove {}: {e}", handle.path.display())))
    }

    /// Fast-forward `target_ref` (e.g. `refs/heads/main`) to the worktree's
    /// current commit, provided that commit descends from the ref's current tip.
    pub fn merge(&self, handle: &WorktreeHandle, target_ref: &str) -> Result<gix::ObjectId> {
        let repo = self.open()?;
        let target_id = repo
            .find_reference(target_ref)
            .map_err(|e| WorktreeError::Object(format!("find_reference {target_ref}: {e}")))?
            .into_fully_peeled_id()
            .map_err(|e| WorktreeError::Object(format!("peel {target_ref}: {e}")))?
            .detach();

        if target_id != handle.base_commit {
            let is_ancestor = repo
                .find_commit(target_id)
                .ok()
                .and_then(|c| c.ancestors().all().ok())
                .map(|mut it| it.any(|a| matches!(a, Ok(info) if info.id == handle.base_commit)))
                .unwrap_or(false);
            if !is_ancestor {
                return Err(WorktreeError::NotFastForward {
                    base: target_id.to_string(),
                    target: handle.base_commit.to_string(),
                });
            }
        }

        repo.reference(
            target_ref,
            handle.base_commit,
            gix::refs::transaction::PreviousValue::MustExistAndMatch(target_id.into()),
            "tron: fast-forward merge from session worktree",
        )
        .map_err(|e| WorktreeError::Object(format!("update {target_ref}: {e}")))?;

        Ok(handle.base_commit)
    }
}

fn session_name(worktree_path: &Path) -> String {
    worktree_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "unknown".to_string())
}

fn default_signature() -> gix::actor::SignatureRef<'static> {
    gix::actor::SignatureRef {
        name: "tron".into(),
        email: "tron@localhost".into(),
        time: gix::date::Time::now_local_or_utc().format(gix::date::time::format::RAW).into(),
    }
}

/// Write every blob in `tree` out onto disk under `dest`.
fn checkout_tree(repo: &gix::Repository, tree: &gix::Tree<'_>, dest: &Path) -> Result<()> {
    for entry in tree.iter() {
        let entry = entry.map_err(|e| WorktreeError::Object(format!("tree entry: {e}")))?;
        let name = entry.filename().to_string();
        let target = dest.join(&name);

        if entry.mode().is_tree() {
            fs::create_dir_all(&target)
                .map_err(|e| WorktreeError::Filesystem(format!("mkdir {}: {e}", target.display())))?;
            let sub_tree = repo
                .find_object(entry.oid())
                .and_then(|o| o.try_into_tree())
                .map_err(|e| WorktreeError::Object(format!("lookup subtree: {e}")))?;
            checkout_tree(repo, &sub_tree, &target)?;
        } else {
            let blob = repo
                .find_blob(entry.oid())
                .map_err(|e| WorktreeError::Object(format!("find_blob {}: {e}", entry.oid())))?;
            fs::write(&target, &blob.data)
                .map_err(|e| WorktreeError::Filesystem(format!("write {}: {e}", target.display())))?;
            #[cfg(unix)]
            if entry.mode().is_executable() {
                use std::os::unix::fs::PermissionsExt;
                if let Ok(meta) = fs::metadata(&target) {
                    let mut perms = meta.permissions();
                    perms.set_mode(perms.mode() | 0o111);
                    let _ = fs::set_permissions(&target, perms);
                }
            }
        }
    }
    Ok(())
}

/// Walk `dir` and write each file as a blob, returning `(relative_path, oid, executable)`.
fn collect_entries(repo: &gix::Repository, dir: &Path) -> Result<Vec<(String, gix::ObjectId, bool)>> {
    let mut entries = Vec::new();
    walk_dir(repo, dir, dir, &mut entries)?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn walk_dir(
    repo: &gix::Repository,
    root: &Path,
    dir: &Path,
    out: &mut Vec<(String, gix::ObjectId, bool)>,
) -> Result<()> {
    for entry in fs::read_dir(dir)
        .map_err(|e| WorktreeError::Filesystem(format!("read_dir {}: {e}", dir.display())))?
    {
        let entry =
            entry.map_err(|e| WorktreeError::Filesystem(format!("read_dir entry: {e}")))?;
        let path = entry.path();
        let file_name = entry.file_name();
        if file_name == ".git" || file_name == ".tron" {
            continue;
        }

        if path.is_dir() {
            walk_dir(repo, root, &path, out)?;
        } else {
            let rel = path
                .strip_prefix(root)
                .map_err(|e| WorktreeError::Filesystem(format!("strip_prefix: {e}")))?
                .to_string_lossy()
                .replace('\\', "/");
            let content = fs::read(&path)
                .map_err(|e| WorktreeError::Filesystem(format!("read {}: {e}", path.display())))?;
            let oid = repo
                .write_blob(&content)
                .map_err(|e| WorktreeError::Object(format!("write_blob: {e}")))?
                .detach();
            #[cfg(unix)]
            let executable = {
                use std::os::unix::fs::PermissionsExt;
                fs::metadata(&path)
                    .map(|m| m.permissions().mode() & 0o111 != 0)
                    .unwrap_or(false)
            };
            #[cfg(not(unix))]
            let executable = false;
            out.push((rel, oid, executable));
        }
    }
    Ok(())
}

/// Build a nested tree object from a sorted list of `(relative_path, blob_oid, executable)`.
fn build_tree_from_entries(
    repo: &gix::Repository,
    entries: &[(String, gix::ObjectId, bool)],
) -> Result<gix::ObjectId> {
    let mut blobs = Vec::new();
    let mut subdirs: BTreeMap<String, Vec<(String, gix::ObjectId, bool)>> = BTreeMap::new();

    for (path, oid, exec) in entries {
        if let Some(slash) = path.find('/') {
            let dir = &path[..slash];
            let rest = &path[slash + 1..];
            subdirs
                .entry(dir.to_string())
                .or_default()
                .push((rest.to_string(), *oid, *exec));
        } else {
            blobs.push((path.clone(), *oid, *exec));
        }
    }

    let mut tree_entries: Vec<gix::objs::tree::Entry> = Vec::new();
    for (dir_name, sub_entries) in &subdirs {
        let sub_tree_id = build_tree_from_entries(repo, sub_entries)?;
        tree_entries.push(gix::objs::tree::Entry {
            mode: gix::objs::tree::EntryKind::Tree.into(),
            filename: dir_name.as_str().into(),
            oid: sub_tree_id,
        });
    }
    for (name, oid, exec) in &blobs {
        let mode = if *exec {
            gix::objs::tree::EntryKind::BlobExecutable.into()
        } else {
            gix::objs::tree::EntryKind::Blob.into()
        };
        tree_entries.push(gix::objs::tree::Entry {
            mode,
            filename: name.as_str().into(),
            oid: *oid,
        });
    }
    tree_entries.sort();

    let tree = gix::objs::Tree {
        entries: tree_entries,
    };
    repo.write_object(&tree)
        .map(|id| id.detach())
        .map_err(|e| WorktreeError::Object(format!("write tree: {e}")))
}
