//! Path extraction from tool call arguments.
//!
//! Pure function that extracts file paths touched by a tool call, converts
//! them to project-relative paths, and filters out paths outside the project.

use std::path::Path;

/// Tool names and their argument keys that contain file paths.
const TOOL_PATH_ARGS: &[(&str, &str)] = &[
    ("Read", "file_path"),
    ("Write", "file_path"),
    ("Edit", "file_path"),
    ("NotebookEdit", "notebook_path"),
    ("Grep", "path"),
    ("Glob", "path"),
    ("Search", "path"),
    ("Find", "path"),
];

/// Extract project-relative file paths touched by a tool call.
///
/// Resolves relative paths against `working_dir`, then strips `project_root`
/// to produce project-relative paths. Returns empty if the tool doesn't touch
/// files or the path is outside the project.
pub fn extract_touched_paths(
    tool_name: &str,
    arguments: &serde_json::Map<String, serde_json::Value>,
    working_dir: &Path,
    project_root: &Path,
) -> Vec<String> {
    let arg_key = match TOOL_PATH_ARGS.iter().find(|(name, _)| *name == tool_name) {
        Some((_, key)) => *key,
        None => return vec![],
    };

    let raw_path = match arguments.get(arg_key).and_then(|v| v.as_str()) {
        Some(p) if !p.is_empty() => p,
        _ => return vec![],
    };

    let absolute = if Path::new(raw_path).is_absolute() {
        Path::new(raw_path).to_path_buf()
    } else {
        working_dir.join(raw_path)
    };

    match absolute.strip_prefix(project_root) {
        Ok(relative) => {
            let rel_str = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy().to_string())
                .collect::<Vec<_>>()
                .join("/");
            if rel_str.is_empty() {
                vec![]
            } else {
                vec![rel_str]
            }
        }
        Err(_) => vec![],
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
