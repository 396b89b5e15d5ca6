//! macOS-specific functionality
//!
//! - Application lookup by bundle identifier
//! - Launching bundles and folders through `open`
//! - Managed preferences through `defaults`

pub mod apps;
pub mod defaults;

pub use apps::*;
