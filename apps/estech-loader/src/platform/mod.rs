//! Platform-specific functionality
//!
//! Each platform module provides an [`AppLookup`](traits::AppLookup) and an
//! [`AppLauncher`](traits::AppLauncher):
//!
//! - **macOS**: bundle ids via Spotlight, launching via `open`
//! - **Linux**: desktop entries and Flatpak ids, launching via `gtk-launch` / `xdg-open`
//! - **Other**: executables on PATH, launched directly

pub mod traits;

#[cfg(target_os = "macos")]
pub mod macos;

#[cfg(target_os = "linux")]
pub mod linux;

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub mod fallback;

#[cfg(target_os = "macos")]
pub use macos::{MacAppLookup as SystemLookup, MacLauncher as SystemLauncher};

#[cfg(target_os = "linux")]
pub use linux::{LinuxAppLookup as SystemLookup, LinuxLauncher as SystemLauncher};

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
pub use fallback::{PathLookup as SystemLookup, DirectLauncher as SystemLauncher};

/// Whether an identifier is safe to hand to platform tools
///
/// Accepts reverse-DNS ids (`com.google.Chrome`) and plain names
/// (`firefox`, `org.mozilla.firefox.desktop`).
pub fn is_valid_identifier(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 255
        && !id.starts_with('.')
        && !id.starts_with('-')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}
