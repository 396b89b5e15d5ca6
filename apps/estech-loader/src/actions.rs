//! User-facing launch actions
//!
//! An [`ActionSet`] is built either from the active configuration or, when
//! no configuration is available at all, from a fixed built-in list. The set
//! is replaced wholesale on every rebuild.

use crate::config::model::{LoaderConfig, LoaderItem};
use crate::launcher::resolver::{resolve, Resolution};
use crate::platform::traits::AppLookup;
use once_cell::sync::Lazy;

/// Ordered identifier and path candidates for one application
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LaunchTarget {
    pub identifiers: Vec<String>,
    pub fallback_locations: Vec<String>,
}

impl LaunchTarget {
    pub fn new(identifiers: Vec<String>, fallback_locations: Vec<String>) -> Self {
        Self {
            identifiers,
            fallback_locations,
        }
    }

    pub fn resolve(&self, lookup: &dyn AppLookup) -> Resolution {
        resolve(self.identifiers.as_slice(), self.fallback_locations.as_slice(), lookup)
    }
}

/// One menu action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub title: String,
    pub command: String,
    pub target: LaunchTarget,
}

impl From<&LoaderItem> for ActionDescriptor {
    fn from(item: &LoaderItem) -> Self {
        Self {
            title: item.title.clone(),
            command: item.command.clone(),
            target: LaunchTarget::new(item.identifiers().to_vec(), item.fallback_paths().to_vec()),
        }
    }
}

/// Where an action set came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSource {
    Configured { version: i64 },
    BuiltIn,
}

/// The actions currently offered to the user, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSet {
    source: ActionSource,
    actions: Vec<ActionDescriptor>,
}

static BUILTIN: Lazy<ActionSet> = Lazy::new(|| ActionSet {
    source: ActionSource::BuiltIn,
    actions: vec![
        builtin(
            "Minecraft Education",
            "minecraft",
            &[
                "com.microsoft.minecraft-edu",
                "com.microsoft.minecrafteducation",
                "com.mojang.minecrafteducation",
                "com.mojang.minecraftEdu",
            ],
            &[
                "/Applications/Minecraft Education.app",
                "/Applications/Minecraft Education Edition.app",
            ],
        ),
        builtin("Safari", "safari", &["com.apple.Safari"], &[]),
        builtin(
            "Google Chrome",
            "chrome",
            &["com.google.Chrome"],
            &["/Applications/Google Chrome.app"],
        ),
        // Ventura+ first, then Monterey
        builtin(
            "System Settings",
            "settings",
            &["com.apple.SystemSettings", "com.apple.systempreferences"],
            &[],
        ),
        // Revealing the home folder opens Finder when the id is unknown
        builtin("Finder", "finder", &["com.apple.finder"], &["~"]),
    ],
});

fn builtin(title: &str, command: &str, ids: &[&str], paths: &[&str]) -> ActionDescriptor {
    ActionDescriptor {
        title: title.to_string(),
        command: command.to_string(),
        target: LaunchTarget::new(
            ids.iter().map(|s| s.to_string()).collect(),
            paths.iter().map(|s| s.to_string()).collect(),
        ),
    }
}

impl ActionSet {
    /// Actions for `config`, or the built-in set when there is no configuration.
    ///
    /// A configuration with no items yields an empty set.
    pub fn from_config(config: Option<&LoaderConfig>) -> Self {
        match config {
            Some(config) => Self {
                source: ActionSource::Configured {
                    version: config.version,
                },
                actions: config.items.iter().map(ActionDescriptor::from).collect(),
            },
            None => Self::builtin(),
        }
    }

    pub fn builtin() -> Self {
        BUILTIN.clone()
    }

    pub fn source(&self) -> ActionSource {
        self.source
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDescriptor> {
        self.actions.iter()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Action whose command matches, ignoring ASCII case
    pub fn find(&self, command: &str) -> Option<&ActionDescriptor> {
        self.actions
            .iter()
            .find(|a| a.command.eq_ignore_ascii_case(command))
    }
}
