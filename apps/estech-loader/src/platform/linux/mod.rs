//! Linux-specific functionality
//!
//! - Application lookup by desktop-entry id, Flatpak app id or PATH command
//! - Launching through `gtk-launch`, `xdg-open` or direct execution

pub mod apps;

pub use apps::*;
