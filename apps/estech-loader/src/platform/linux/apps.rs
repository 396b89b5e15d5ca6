//! Linux application lookup and launching
//!
//! On Linux an identifier is a desktop-entry id (`firefox`,
//! `org.mozilla.firefox`, `com.google.Chrome` for Flatpak installs). Entries
//! are searched in the XDG application directories, Flatpak exports and the
//! Snap desktop directory. An identifier without a desktop entry may still
//! name an executable on PATH.

use crate::error::{LoaderError, Result};
use crate::platform::is_valid_identifier;
use crate::platform::traits::{AppLauncher, AppLookup};
use crate::utils::paths::{file_stem, home_dir};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use which::which;

const DEFAULT_DATA_DIRS: &str = "/usr/local/share:/usr/share";

/// System-wide directories that hold exported desktop entries
const EXTRA_APPLICATION_DIRS: &[&str] = &[
    "/var/lib/flatpak/exports/share/applications",
    "/var/lib/snapd/desktop/applications",
];

/// Lookup against desktop entries and PATH
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxAppLookup;

impl AppLookup for LinuxAppLookup {
    fn resolve_identifier(&self, id: &str) -> Option<PathBuf> {
        if !is_valid_identifier(id) {
            tracing::debug!("Skipping malformed application id {:?}", id);
            return None;
        }

        let entry = desktop_file_name(id);
        if let Some(found) = application_dirs()
            .into_iter()
            .map(|dir| dir.join(&entry))
            .find(|candidate| candidate.is_file())
        {
            return Some(found);
        }

        which(id).ok()
    }

    fn path_exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// `firefox` -> `firefox.desktop`; already-suffixed ids are kept
pub fn desktop_file_name(id: &str) -> String {
    if id.ends_with(".desktop") {
        id.to_string()
    } else {
        format!("{id}.desktop")
    }
}

/// Application directories in XDG precedence order
fn application_dirs() -> Vec<PathBuf> {
    let data_home = std::env::var_os("XDG_DATA_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| directories::BaseDirs::new().map(|d| d.data_dir().to_path_buf()));
    let data_dirs = std::env::var("XDG_DATA_DIRS").unwrap_or_default();

    let mut dirs: Vec<PathBuf> = Vec::new();
    if let Some(home) = data_home {
        dirs.push(home.join("applications"));
    }
    if let Some(home) = home_dir() {
        dirs.push(home.join(".local/share/flatpak/exports/share/applications"));
    }
    dirs.extend(
        parse_data_dirs(&data_dirs)
            .into_iter()
            .map(|d| d.join("applications")),
    );
    dirs.extend(EXTRA_APPLICATION_DIRS.iter().map(PathBuf::from));
    dirs
}

/// Split `XDG_DATA_DIRS`, falling back to the XDG default when unset or empty
fn parse_data_dirs(value: &str) -> Vec<PathBuf> {
    let value = if value.trim().is_empty() {
        DEFAULT_DATA_DIRS
    } else {
        value
    };
    value
        .split(':')
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .collect()
}

/// Launches desktop entries, executables and documents
#[derive(Debug, Default, Clone, Copy)]
pub struct LinuxLauncher;

impl AppLauncher for LinuxLauncher {
    fn launch(&self, location: &Path) -> Result<()> {
        let mut command = launch_command(location);
        command
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        command
            .spawn()
            .map(|_child| ())
            .map_err(|e| LoaderError::launch_failed(location, e.to_string()))
    }
}

fn launch_command(location: &Path) -> Command {
    let is_desktop_entry = location.extension().is_some_and(|ext| ext == "desktop");

    if is_desktop_entry {
        let mut command = Command::new("gtk-launch");
        command.arg(file_stem(location).unwrap_or_default());
        command
    } else if is_executable(location) {
        Command::new(location)
    } else {
        let mut command = Command::new("xdg-open");
        command.arg(location);
        command
    }
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    std::fs::metadata(path)
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}
