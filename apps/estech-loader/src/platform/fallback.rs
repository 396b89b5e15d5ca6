//! Generic lookup and launching for platforms without an application registry
//!
//! Identifiers are treated as command names on PATH and launched directly.

use crate::error::{LoaderError, Result};
use crate::platform::is_valid_identifier;
use crate::platform::traits::{AppLauncher, AppLookup};
use std::path::{Path, PathBuf};
use std::process::Command;
use which::which;

#[derive(Debug, Default, Clone, Copy)]
pub struct PathLookup;

impl AppLookup for PathLookup {
    fn resolve_identifier(&self, id: &str) -> Option<PathBuf> {
        if !is_valid_identifier(id) {
            return None;
        }
        which(id).ok()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DirectLauncher;

impl AppLauncher for DirectLauncher {
    fn launch(&self, location: &Path) -> Result<()> {
        Command::new(location)
            .spawn()
            .map(|_child| ())
            .map_err(|e| LoaderError::launch_failed(location, e.to_string()))
    }
}
