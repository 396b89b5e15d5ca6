//! Platform abstraction types
//!
//! The resolver and launcher only see these two capabilities. Each OS module
//! provides a concrete implementation; tests inject in-memory fakes.

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Read-only queries against the OS application registry and filesystem
pub trait AppLookup: Send + Sync {
    /// Location of the application registered under `id`, if installed
    fn resolve_identifier(&self, id: &str) -> Option<PathBuf>;

    /// Whether something exists at `path`
    fn path_exists(&self, path: &Path) -> bool;
}

/// Opens a located application, bundle or directory
pub trait AppLauncher: Send + Sync {
    fn launch(&self, location: &Path) -> Result<()>;
}
