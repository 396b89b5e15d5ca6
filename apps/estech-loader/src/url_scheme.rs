//! `estech://` URL handling
//!
//! Accepted forms, all case-insensitive:
//!
//! - `estech://chrome`
//! - `estech://open/chrome`
//! - `estech://open?target=chrome`
//!
//! The result is a command string matched against the active actions.

use crate::error::{LoaderError, Result};
use reqwest::Url;

pub const SCHEME: &str = "estech";

/// Host that introduces a command in the path or `target` query
const OPEN_HOST: &str = "open";

/// Extract the command a URL asks for
pub fn parse_command(raw: &str) -> Result<String> {
    let url = Url::parse(raw.trim())
        .map_err(|e| LoaderError::General(format!("Invalid URL {raw:?}: {e}")))?;

    if !url.scheme().eq_ignore_ascii_case(SCHEME) {
        return Err(LoaderError::General(format!(
            "Unexpected scheme: {}",
            url.scheme()
        )));
    }

    let host = url
        .host_str()
        .map(str::to_lowercase)
        .filter(|h| !h.is_empty() && h != OPEN_HOST);
    let first_path = url
        .path_segments()
        .and_then(|mut segments| segments.find(|s| !s.is_empty()))
        .map(str::to_lowercase);
    let query_target = url
        .query_pairs()
        .find(|(name, _)| name.eq_ignore_ascii_case("target"))
        .map(|(_, value)| value.to_lowercase())
        .filter(|v| !v.is_empty());

    let command = host
        .or(first_path)
        .or(query_target)
        .ok_or_else(|| LoaderError::General(format!("No command in URL {raw:?}")))?;

    tracing::info!("Received URL: {} -> command={}", url, command);
    Ok(canonical_command(&command).to_string())
}

/// Map command aliases onto the commands used by actions
pub fn canonical_command(command: &str) -> &str {
    match command {
        "preferences" => "settings",
        other => other,
    }
}
