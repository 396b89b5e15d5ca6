//! Configuration document types
//!
//! The same JSON schema is used on the wire, in the cache file and in the
//! locally deployed override:
//!
//! ```json
//! {
//!   "version": 4,
//!   "items": [
//!     { "title": "Google Chrome", "command": "chrome",
//!       "bundleIds": ["com.google.Chrome"],
//!       "paths": ["/Applications/Google Chrome.app"] }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Maximum number of bytes of a rejected payload kept for diagnostics
pub const BODY_SNIPPET_LIMIT: usize = 256;

/// One action record in a configuration document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoaderItem {
    /// Display string for the action
    pub title: String,
    /// Opaque command tag (also used by the URL scheme)
    pub command: String,
    /// Platform identifiers, tried in order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bundle_ids: Option<Vec<String>>,
    /// Fallback filesystem locations, tried after all identifiers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paths: Option<Vec<String>>,
}

impl LoaderItem {
    /// Identifiers, treating an absent list as empty
    pub fn identifiers(&self) -> &[String] {
        self.bundle_ids.as_deref().unwrap_or_default()
    }

    /// Fallback paths, treating an absent list as empty
    pub fn fallback_paths(&self) -> &[String] {
        self.paths.as_deref().unwrap_or_default()
    }
}

/// A versioned configuration document
///
/// `version` is compared for equality only. A document with no items is a
/// valid configuration and is distinct from having no configuration at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub version: i64,
    pub items: Vec<LoaderItem>,
}

impl LoaderConfig {
    /// Decode a document from raw JSON bytes
    pub fn from_slice(bytes: &[u8]) -> serde_json::Result<Self> {
        serde_json::from_slice(bytes)
    }

    /// Encode the document as pretty-printed JSON
    pub fn to_vec_pretty(&self) -> serde_json::Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
    }
}

/// Bounded, lossy UTF-8 prefix of a payload for log output
pub fn body_snippet(bytes: &[u8]) -> String {
    let end = bytes.len().min(BODY_SNIPPET_LIMIT);
    let mut snippet = String::from_utf8_lossy(&bytes[..end]).into_owned();
    if bytes.len() > BODY_SNIPPET_LIMIT {
        snippet.push('…');
    }
    snippet
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "version": 7,
        "items": [
            {
                "title": "Minecraft Education",
                "command": "minecraft",
                "bundleIds": ["com.microsoft.minecraft-edu", "com.mojang.minecraftEdu"],
                "paths": ["/Applications/Minecraft Education.app"]
            },
            { "title": "Safari", "command": "safari", "bundleIds": ["com.apple.Safari"] },
            { "title": "Scratch", "command": "scratch" }
        ]
    }"#;

    #[test]
    fn test_decode_keeps_item_order() {
        let cfg = LoaderConfig::from_slice(SAMPLE.as_bytes()).unwrap();
        assert_eq!(cfg.version, 7);
        let commands: Vec<&str> = cfg.items.iter().map(|i| i.command.as_str()).collect();
        assert_eq!(commands, vec!["minecraft", "safari", "scratch"]);
        assert_eq!(
            cfg.items[0].identifiers(),
            &["com.microsoft.minecraft-edu", "com.mojang.minecraftEdu"]
        );
    }

    #[test]
    fn test_absent_lists_are_empty() {
        let cfg = LoaderConfig::from_slice(SAMPLE.as_bytes()).unwrap();
        let scratch = &cfg.items[2];
        assert!(scratch.bundle_ids.is_none());
        assert!(scratch.identifiers().is_empty());
        assert!(scratch.fallback_paths().is_empty());
    }

    #[test]
    fn test_round_trip_preserves_optional_presence() {
        let cfg = LoaderConfig::from_slice(SAMPLE.as_bytes()).unwrap();
        let bytes = cfg.to_vec_pretty().unwrap();
        let json = String::from_utf8(bytes.clone()).unwrap();
        assert_eq!(json.matches("\"paths\"").count(), 1);

        let decoded = LoaderConfig::from_slice(&bytes).unwrap();
        assert_eq!(decoded, cfg);
    }

    #[test]
    fn test_empty_items_is_valid() {
        let cfg = LoaderConfig::from_slice(br#"{"version": 1, "items": []}"#).unwrap();
        assert!(cfg.items.is_empty());
    }

    #[test]
    fn test_missing_version_is_rejected() {
        assert!(LoaderConfig::from_slice(br#"{"items": []}"#).is_err());
        assert!(LoaderConfig::from_slice(b"<html>not json</html>").is_err());
    }

    #[test]
    fn test_body_snippet_is_bounded() {
        let body = vec![b'x'; BODY_SNIPPET_LIMIT * 2];
        let snippet = body_snippet(&body);
        assert_eq!(snippet.chars().count(), BODY_SNIPPET_LIMIT + 1);
        assert_eq!(body_snippet(b"short"), "short");
    }
}
