//! macOS application lookup and launching
//!
//! Bundle identifiers are resolved through Spotlight (`mdfind`), which is
//! what Launch Services consults as well. Launching goes through `open`, so
//! `.app` bundles start as applications and folders open in Finder.

use crate::error::{LoaderError, Result};
use crate::platform::is_valid_identifier;
use crate::platform::traits::{AppLauncher, AppLookup};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Lookup against Launch Services metadata
#[derive(Debug, Default, Clone, Copy)]
pub struct MacAppLookup;

impl AppLookup for MacAppLookup {
    fn resolve_identifier(&self, id: &str) -> Option<PathBuf> {
        if !is_valid_identifier(id) {
            tracing::debug!("Skipping malformed bundle id {:?}", id);
            return None;
        }

        let output = Command::new("mdfind")
            .arg(spotlight_query(id))
            .output()
            .map_err(|e| tracing::warn!("mdfind unavailable: {}", e))
            .ok()?;

        if !output.status.success() {
            return None;
        }

        first_bundle(&String::from_utf8_lossy(&output.stdout))
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Spotlight query matching an application bundle id exactly
fn spotlight_query(id: &str) -> String {
    format!("kMDItemCFBundleIdentifier == '{}'", id)
}

/// First existing `.app` bundle in `mdfind` output, preferring /Applications
fn first_bundle(stdout: &str) -> Option<PathBuf> {
    let mut bundles: Vec<PathBuf> = stdout
        .lines()
        .map(str::trim)
        .filter(|line| line.ends_with(".app"))
        .map(PathBuf::from)
        .collect();

    bundles.sort_by_key(|p| !p.starts_with("/Applications"));
    bundles.into_iter().find(|p| p.exists())
}

/// Launches through `open`
#[derive(Debug, Default, Clone, Copy)]
pub struct MacLauncher;

impl AppLauncher for MacLauncher {
    fn launch(&self, location: &Path) -> Result<()> {
        let status = Command::new("open")
            .arg(location)
            .status()
            .map_err(|e| LoaderError::launch_failed(location, e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(LoaderError::launch_failed(
                location,
                format!("`open` exited with {}", status),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spotlight_query() {
        assert_eq!(
            spotlight_query("com.apple.Safari"),
            "kMDItemCFBundleIdentifier == 'com.apple.Safari'"
        );
    }

    #[test]
    fn test_first_bundle_ignores_non_bundles() {
        assert_eq!(first_bundle("/tmp/readme.txt\n/nowhere/Fake.app\n"), None);
    }

    #[test]
    fn test_malformed_bundle_id_is_not_queried() {
        assert_eq!(MacAppLookup.resolve_identifier("x' || kMDItemFSName == '*"), None);
    }
}
