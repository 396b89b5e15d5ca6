//! Resolve-then-launch
//!
//! Resolution and launching are separate steps. When the resolved location
//! fails to launch, the remaining candidates are not tried; the failure is
//! reported as [`LoaderError::LaunchFailed`].

pub mod resolver;

pub use resolver::{resolve, Resolution, ResolvedTarget, TargetSource};

use crate::actions::LaunchTarget;
use crate::error::{LoaderError, Result};
use crate::platform::traits::{AppLauncher, AppLookup};

/// Resolve `target` and open the first available candidate
///
/// Returns `Ok(Resolution::NotFound)` when nothing matched.
pub fn open_target(
    target: &LaunchTarget,
    lookup: &dyn AppLookup,
    launcher: &dyn AppLauncher,
) -> Result<Resolution> {
    let resolution = target.resolve(lookup);

    let Resolution::Found(found) = &resolution else {
        tracing::error!("Failed to locate app via provided identifiers and paths");
        return Ok(resolution);
    };

    match &found.source {
        TargetSource::Identifier(id) => tracing::info!(
            "Launching via identifier {} at {}",
            id,
            found.location.display()
        ),
        TargetSource::Path => tracing::info!("Launching via path {}", found.location.display()),
    }

    launcher.launch(&found.location).map_err(|e| match e {
        LoaderError::LaunchFailed { .. } => e,
        other => LoaderError::launch_failed(&found.location, other.to_string()),
    })?;

    Ok(resolution)
}
