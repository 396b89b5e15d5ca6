//! Path utilities for configured fallback locations
//!
//! Configuration documents may list fallback paths relative to the user's
//! home directory (`~/Applications/Zoom.app`). These helpers expand them
//! before any existence check.

use std::path::{Path, PathBuf};

/// Expand tilde (~) to the user's home directory
///
/// # Arguments
/// * `path` - A path string that may start with ~/
///
/// # Returns
/// The expanded path, or the input unchanged when it has no tilde prefix or
/// the home directory is unknown
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = home_dir() {
            return home.join(stripped);
        }
    } else if path == "~" {
        if let Some(home) = home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Get the user's home directory
///
/// Uses the `home` crate on POSIX systems, falls back to directories crate otherwise
pub fn home_dir() -> Option<PathBuf> {
    #[cfg(unix)]
    {
        home::home_dir()
    }
    #[cfg(not(unix))]
    {
        directories::BaseDirs::new().map(|dirs| dirs.home_dir().to_path_buf())
    }
}

/// Extract the file stem from a path (`/usr/share/applications/firefox.desktop` -> `firefox`)
pub fn file_stem(path: &Path) -> Option<String> {
    path.file_stem().map(|n| n.to_string_lossy().to_string())
}
