//! Chrome binary discovery on macOS.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Known Chrome binary locations on macOS, in search priority order.
const KNOWN_PATHS: &[&str] = &[
    "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
    "/Applications/Chromium.app/Contents/MacOS/Chromium",
    "/Applications/Google Chrome Canary.app/Contents/MacOS/Google Chrome Canary",
    "/opt/homebrew/bin/chromium",
    "/usr/local/bin/chromium",
];

/// Find a Chrome or Chromium binary on the system.
///
/// Search order:
/// 1. `CHROME_PATH` environment variable
/// 2. System application paths (Chrome, Chromium, Chrome Canary)
/// 3. Homebrew paths
///
/// Returns `None` if no valid executable is found.
pub fn find_chrome() -> Option<PathBuf> {
    // 1. Environment variable override
    if let Ok(env_path) = std::env::var("CHROME_PATH") {
        let path = PathBuf::from(&env_path);
        if is_executable(&path) {
            return Some(path);
        }
        tracing::debug!(path = %env_path, "CHROME_PATH set but not executable, falling through");
    }

    // 2. Known system paths
    for candidate in KNOWN_PATHS {
        let path = PathBuf::from(candidate);
        if is_executable(&path) {
            tracing::debug!(path = %candidate, "found Chrome binary");
            return Some(path);
        }
    }

    None
}

/// Return the ordered list of candidate paths (excluding env var).
pub fn search_paths() -> Vec<PathBuf> {
    KNOWN_PATHS.iter().map(PathBuf::from).collect()
}

/// Check if a path exists and is executable.
fn is_executable(path: &Path) -> bool {
    path.is_file()
        && path
            .metadata()
            .map(|m| m.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
}
