//! Loader settings and preference sources
//!
//! Resolves where the local override and the cache live on this OS, which
//! remote URL is the built-in default, and where an administrator-supplied
//! URL override is read from: the environment, then (on macOS) the managed
//! defaults domain, then a JSON file beside the local override.

use crate::error::{LoaderError, Result};
#[cfg(not(target_os = "macos"))]
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Built-in remote configuration document
pub const DEFAULT_REMOTE_URL: &str =
    "https://raw.githubusercontent.com/marcuselsi/es-tech-loader/main/Config/loader-config.json";

/// Preference key holding an alternate remote URL
pub const REMOTE_URL_PREFERENCE: &str = "RemoteConfigURL";

/// Environment variable consulted before the preferences file
pub const REMOTE_URL_ENV: &str = "ESTECH_REMOTE_CONFIG_URL";

/// File name shared by the local override and the cache
pub const CONFIG_FILE_NAME: &str = "loader-config.json";

/// Administrator preferences file, stored next to the local override
pub const PREFERENCES_FILE_NAME: &str = "preferences.json";

const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(30 * 60);

/// Resolved loader settings
#[derive(Debug, Clone)]
pub struct LoaderSettings {
    /// Read-only override deployed by IT
    pub local_config_path: PathBuf,
    /// Last-known-good copy of the remote document
    pub cache_path: PathBuf,
    /// Remote document used when no override address is configured
    pub default_remote_url: String,
    /// Upper bound for a single fetch attempt
    pub fetch_timeout: Duration,
    /// Interval between background refreshes
    pub refresh_interval: Duration,
}

impl LoaderSettings {
    /// Settings for the current OS and user
    pub fn system() -> Result<Self> {
        Self::resolve(None, None)
    }

    /// System settings with optional path overrides.
    ///
    /// The per-user data directory is only looked up when no cache path is
    /// given.
    pub fn resolve(local_config_path: Option<PathBuf>, cache_path: Option<PathBuf>) -> Result<Self> {
        let local_config_path =
            local_config_path.unwrap_or_else(|| system_config_dir().join(CONFIG_FILE_NAME));
        let cache_path = match cache_path {
            Some(path) => path,
            None => cache_dir()?.join(CONFIG_FILE_NAME),
        };
        Ok(Self::with_paths(local_config_path, cache_path))
    }

    /// Settings rooted at arbitrary paths (tests, portable installs)
    pub fn with_paths(local_config_path: impl Into<PathBuf>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            local_config_path: local_config_path.into(),
            cache_path: cache_path.into(),
            default_remote_url: DEFAULT_REMOTE_URL.to_string(),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
        }
    }

    /// Preferences file that sits beside the local override
    pub fn preferences_path(&self) -> PathBuf {
        self.local_config_path
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(PREFERENCES_FILE_NAME)
    }
}

/// Machine-wide directory managed by IT (read-only to the loader)
fn system_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        PathBuf::from("/Library/Application Support/ES Tech Loader")
    }
    #[cfg(windows)]
    {
        let base = std::env::var_os("ProgramData")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(r"C:\ProgramData"));
        base.join("ES Tech Loader")
    }
    #[cfg(not(any(target_os = "macos", windows)))]
    {
        PathBuf::from("/etc/estech-loader")
    }
}

/// Per-user application-state directory
///
/// `~/Library/Application Support/ES Tech Loader` on macOS, so caches
/// written by earlier releases are picked up.
#[cfg(target_os = "macos")]
fn cache_dir() -> Result<PathBuf> {
    directories::BaseDirs::new()
        .map(|dirs| dirs.data_dir().join("ES Tech Loader"))
        .ok_or_else(|| LoaderError::config("Could not determine the user data directory"))
}

#[cfg(not(target_os = "macos"))]
fn cache_dir() -> Result<PathBuf> {
    ProjectDirs::from("ca", "elsipogtog", "ES Tech Loader")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| LoaderError::config("Could not determine the user data directory"))
}

/// Source of named string preferences
pub trait Preferences: Send + Sync {
    /// Current value of `key`, if any. Read fresh on every call.
    fn string(&self, key: &str) -> Option<String>;
}

/// Environment first, then the defaults domains (macOS), then the JSON file
#[derive(Debug, Clone)]
pub struct SystemPreferences {
    env_var: String,
    defaults_domains: Vec<String>,
    file: PathBuf,
}

impl SystemPreferences {
    pub fn new(file: impl Into<PathBuf>) -> Self {
        Self {
            env_var: REMOTE_URL_ENV.to_string(),
            defaults_domains: default_domains(),
            file: file.into(),
        }
    }

    /// Replace the defaults domains searched for values
    pub fn with_defaults_domains(mut self, domains: Vec<String>) -> Self {
        self.defaults_domains = domains;
        self
    }

    #[cfg(target_os = "macos")]
    fn defaults_value(&self, key: &str) -> Option<String> {
        self.defaults_domains
            .iter()
            .find_map(|domain| crate::platform::macos::defaults::read_string(domain, key))
    }

    #[cfg(not(target_os = "macos"))]
    fn defaults_value(&self, _key: &str) -> Option<String> {
        if !self.defaults_domains.is_empty() {
            tracing::debug!("Defaults domains are only read on macOS");
        }
        None
    }

    fn file_value(&self, key: &str) -> Option<String> {
        let bytes = std::fs::read(&self.file).ok()?;
        let value: serde_json::Value = match serde_json::from_slice(&bytes) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Ignoring malformed preferences file {}: {}", self.file.display(), e);
                return None;
            }
        };
        value.get(key)?.as_str().map(str::to_string)
    }
}

impl Preferences for SystemPreferences {
    fn string(&self, key: &str) -> Option<String> {
        if key == REMOTE_URL_PREFERENCE {
            if let Ok(value) = std::env::var(&self.env_var) {
                if !value.trim().is_empty() {
                    return Some(value);
                }
            }
        }
        self.defaults_value(key).or_else(|| self.file_value(key))
    }
}

#[cfg(target_os = "macos")]
fn default_domains() -> Vec<String> {
    crate::platform::macos::defaults::search_domains()
}

#[cfg(not(target_os = "macos"))]
fn default_domains() -> Vec<String> {
    Vec::new()
}

/// Fixed preferences, used by the CLI `--remote-url` flag and tests
#[derive(Debug, Clone, Default)]
pub struct StaticPreferences {
    remote_url: Option<String>,
}

impl StaticPreferences {
    pub fn new(remote_url: Option<String>) -> Self {
        Self { remote_url }
    }
}

impl Preferences for StaticPreferences {
    fn string(&self, key: &str) -> Option<String> {
        match key {
            REMOTE_URL_PREFERENCE => self.remote_url.clone(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_preferences_path_is_beside_local_override() {
        let settings = LoaderSettings::with_paths("/etc/estech-loader/loader-config.json", "/tmp/c.json");
        assert_eq!(
            settings.preferences_path(),
            PathBuf::from("/etc/estech-loader/preferences.json")
        );
    }

    #[test]
    fn test_preferences_file_lookup() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(PREFERENCES_FILE_NAME);
        std::fs::write(&file, r#"{"RemoteConfigURL": "https://example.org/cfg.json"}"#).unwrap();

        let mut prefs = SystemPreferences::new(&file).with_defaults_domains(Vec::new());
        prefs.env_var = "ESTECH_TEST_UNSET_VARIABLE".to_string();

        assert_eq!(
            prefs.string(REMOTE_URL_PREFERENCE).as_deref(),
            Some("https://example.org/cfg.json")
        );
        assert_eq!(prefs.string("Other"), None);
    }

    #[test]
    fn test_malformed_preferences_file_is_ignored() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(PREFERENCES_FILE_NAME);
        std::fs::write(&file, "RemoteConfigURL = nope").unwrap();

        let mut prefs = SystemPreferences::new(&file).with_defaults_domains(Vec::new());
        prefs.env_var = "ESTECH_TEST_UNSET_VARIABLE".to_string();
        assert_eq!(prefs.string(REMOTE_URL_PREFERENCE), None);
    }

    #[test]
    fn test_resolve_keeps_explicit_paths() {
        let settings = LoaderSettings::resolve(
            Some(PathBuf::from("/srv/loader/local.json")),
            Some(PathBuf::from("/srv/loader/cache.json")),
        )
        .unwrap();
        assert_eq!(settings.local_config_path, PathBuf::from("/srv/loader/local.json"));
        assert_eq!(settings.cache_path, PathBuf::from("/srv/loader/cache.json"));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_macos_cache_lives_in_application_support() {
        let settings = LoaderSettings::system().unwrap();
        assert!(settings
            .cache_path
            .ends_with("Library/Application Support/ES Tech Loader/loader-config.json"));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_defaults_domain_wins_over_preferences_file() {
        let dir = tempdir().unwrap();
        let file = dir.path().join(PREFERENCES_FILE_NAME);
        std::fs::write(&file, r#"{"RemoteConfigURL": "https://file.example.org/cfg.json"}"#).unwrap();

        let domain = dir.path().join("ca.elsipogtog.estechloader").display().to_string();
        let status = std::process::Command::new("defaults")
            .args(["write", &domain, REMOTE_URL_PREFERENCE, "-string", "https://mdm.example.org/cfg.json"])
            .status()
            .unwrap();
        assert!(status.success());

        let mut prefs = SystemPreferences::new(&file).with_defaults_domains(vec![domain]);
        prefs.env_var = "ESTECH_TEST_UNSET_VARIABLE".to_string();
        assert_eq!(
            prefs.string(REMOTE_URL_PREFERENCE).as_deref(),
            Some("https://mdm.example.org/cfg.json")
        );
    }

    #[test]
    fn test_static_preferences() {
        let prefs = StaticPreferences::new(Some("https://a.example/x.json".to_string()));
        assert!(prefs.string(REMOTE_URL_PREFERENCE).is_some());
        assert!(StaticPreferences::default().string(REMOTE_URL_PREFERENCE).is_none());
    }
}
