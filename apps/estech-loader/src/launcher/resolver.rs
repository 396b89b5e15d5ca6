//! First-match candidate resolution
//!
//! Identifiers are tried in the order given, then fallback paths in the order
//! given. The first hit wins. Duplicates are queried again rather than
//! skipped, and every rejected candidate is logged.

use crate::platform::traits::AppLookup;
use crate::utils::paths::expand_tilde;
use std::path::PathBuf;

/// How a target was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSource {
    /// Resolved through the application registry
    Identifier(String),
    /// An existing fallback path
    Path,
}

/// A launchable location
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub location: PathBuf,
    pub source: TargetSource,
}

/// Outcome of resolving a candidate list. `NotFound` is an ordinary result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Found(ResolvedTarget),
    NotFound,
}

impl Resolution {
    pub fn target(&self) -> Option<&ResolvedTarget> {
        match self {
            Resolution::Found(target) => Some(target),
            Resolution::NotFound => None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found(_))
    }
}

/// Resolve the first available candidate
pub fn resolve<I, P>(identifiers: &[I], paths: &[P], lookup: &dyn AppLookup) -> Resolution
where
    I: AsRef<str>,
    P: AsRef<str>,
{
    for id in identifiers {
        let id = id.as_ref();
        match lookup.resolve_identifier(id) {
            Some(location) => {
                tracing::info!("Resolved identifier {} at {}", id, location.display());
                return Resolution::Found(ResolvedTarget {
                    location,
                    source: TargetSource::Identifier(id.to_string()),
                });
            }
            None => tracing::debug!("Identifier not found: {}", id),
        }
    }

    for path in paths {
        let location = expand_tilde(path.as_ref());
        if lookup.path_exists(&location) {
            tracing::info!("Resolved path {}", location.display());
            return Resolution::Found(ResolvedTarget {
                location,
                source: TargetSource::Path,
            });
        }
        tracing::debug!("Path not found: {}", location.display());
    }

    Resolution::NotFound
}
