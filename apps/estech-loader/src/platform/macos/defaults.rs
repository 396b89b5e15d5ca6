//! Managed preferences from the macOS defaults system
//!
//! Administrators deploy `RemoteConfigURL` through MDM or with
//! `defaults write`. Values are read through the `defaults` tool, which
//! understands both binary and XML property lists.

use std::path::PathBuf;
use std::process::Command;

/// Preferences domain of the loader
pub const DEFAULTS_DOMAIN: &str = "ca.elsipogtog.estechloader";

/// Domains searched for a key, highest precedence first
///
/// Managed (MDM) values win over the user's own domain, which wins over the
/// machine-wide `/Library/Preferences` plist.
pub fn search_domains() -> Vec<String> {
    vec![
        format!("/Library/Managed Preferences/{DEFAULTS_DOMAIN}"),
        DEFAULTS_DOMAIN.to_string(),
        format!("/Library/Preferences/{DEFAULTS_DOMAIN}"),
    ]
}

/// String value of `key` in `domain`, if the domain defines it
///
/// `domain` is either a bundle-style domain or a plist path without the
/// `.plist` extension.
pub fn read_string(domain: &str, key: &str) -> Option<String> {
    if domain.starts_with('/') && !plist_path(domain).exists() {
        return None;
    }

    let output = Command::new("defaults")
        .args(["read", domain, key])
        .output()
        .map_err(|e| tracing::warn!("defaults unavailable: {}", e))
        .ok()?;

    if !output.status.success() {
        tracing::trace!("{} not set in {}", key, domain);
        return None;
    }

    let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
    (!value.is_empty()).then_some(value)
}

fn plist_path(domain: &str) -> PathBuf {
    PathBuf::from(format!("{domain}.plist"))
}
