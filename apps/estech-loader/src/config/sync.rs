//! Configuration sync engine
//!
//! Decides which configuration drives the launcher:
//!
//! 1. At startup, [`ConfigSyncEngine::load_preferred`] picks the local
//!    override, else the cache, else nothing. No network I/O.
//! 2. [`ConfigFetcher::fetch_latest`] retrieves the remote document and
//!    refreshes the cache when it decodes.
//! 3. [`ConfigSyncEngine::apply`] adopts a fetched document only when its
//!    version differs from the active one.
//!
//! Fetches may run on any task, but `apply` takes `&mut self`, so outcomes
//! are applied one at a time by whoever owns the engine.

use super::model::{body_snippet, LoaderConfig};
use super::remote::{HttpTransport, RemoteAddress, ReqwestTransport};
use super::store::{ConfigSlot, ConfigStore};
use crate::error::{FetchError, LoaderError, Result};
use crate::settings::{LoaderSettings, Preferences};
use reqwest::Url;
use std::sync::Arc;

/// Result of a single remote fetch
pub type FetchOutcome = std::result::Result<LoaderConfig, FetchError>;

/// Whether the UI must regenerate its actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RebuildSignal {
    Rebuild,
    NoRebuild,
}

impl RebuildSignal {
    pub fn is_rebuild(self) -> bool {
        matches!(self, RebuildSignal::Rebuild)
    }
}

/// The configuration currently driving the UI
///
/// Replaced whole, never edited in place.
#[derive(Debug, Default)]
pub struct ActiveConfig {
    current: Option<Arc<LoaderConfig>>,
}

impl ActiveConfig {
    pub fn new(initial: Option<LoaderConfig>) -> Self {
        Self {
            current: initial.map(Arc::new),
        }
    }

    pub fn get(&self) -> Option<Arc<LoaderConfig>> {
        self.current.clone()
    }

    pub fn version(&self) -> Option<i64> {
        self.current.as_ref().map(|c| c.version)
    }

    /// Swap in `candidate` when its version differs from the active one.
    ///
    /// Only inequality matters: a lower version replaces a higher one.
    pub fn replace_if_changed(&mut self, candidate: LoaderConfig) -> RebuildSignal {
        if self.version() == Some(candidate.version) {
            return RebuildSignal::NoRebuild;
        }
        self.current = Some(Arc::new(candidate));
        RebuildSignal::Rebuild
    }
}

/// Performs remote fetches. Cheap to clone and safe to move into a task.
#[derive(Clone)]
pub struct ConfigFetcher {
    store: Arc<ConfigStore>,
    transport: Arc<dyn HttpTransport>,
    address: RemoteAddress,
}

impl ConfigFetcher {
    /// Fetch the remote document and, if it decodes, write it to the cache.
    ///
    /// The cache is only touched when a success status carries a decodable
    /// body. A failed cache write is logged and does not fail the fetch.
    pub async fn fetch_latest(&self) -> FetchOutcome {
        let url = self.address.resolve();
        tracing::info!("Fetching remote config: {}", url);

        let response = match self.transport.get(&url).await {
            Ok(response) => response,
            Err(detail) => {
                tracing::error!("Config fetch failed: {}", detail);
                return Err(FetchError::Transport(detail));
            }
        };

        tracing::info!(status = response.status, "Remote config responded");
        if !response.is_success() {
            tracing::error!(
                "Config fetch returned HTTP {} ({} byte body)",
                response.status,
                response.body.len()
            );
            return Err(FetchError::RemoteStatus(response.status));
        }

        self.store.record_remote(&response.body);

        let config = match LoaderConfig::from_slice(&response.body) {
            Ok(config) => config,
            Err(e) => {
                let snippet = body_snippet(&response.body);
                tracing::error!("Config decode failed: {}; body starts with {:?}", e, snippet);
                return Err(FetchError::Decode {
                    detail: e.to_string(),
                    body_snippet: snippet,
                });
            }
        };

        if let Err(e) = self.store.write(ConfigSlot::Cache, &response.body) {
            tracing::error!("Cache write failed: {}", e);
        }

        Ok(config)
    }
}

/// Owns the active configuration and reconciles it with the three slots
pub struct ConfigSyncEngine {
    store: Arc<ConfigStore>,
    fetcher: ConfigFetcher,
    active: ActiveConfig,
}

impl ConfigSyncEngine {
    pub fn new(
        store: Arc<ConfigStore>,
        transport: Arc<dyn HttpTransport>,
        address: RemoteAddress,
    ) -> Self {
        let fetcher = ConfigFetcher {
            store: store.clone(),
            transport,
            address,
        };
        Self {
            store,
            fetcher,
            active: ActiveConfig::default(),
        }
    }

    /// Production engine: file-backed store, reqwest transport
    pub fn from_settings(settings: &LoaderSettings, preferences: Arc<dyn Preferences>) -> Result<Self> {
        let default_url = Url::parse(&settings.default_remote_url).map_err(|e| {
            LoaderError::config(format!(
                "invalid default remote URL {:?}: {e}",
                settings.default_remote_url
            ))
        })?;
        let store = Arc::new(ConfigStore::new(
            &settings.local_config_path,
            &settings.cache_path,
        ));
        let transport = Arc::new(ReqwestTransport::new(settings.fetch_timeout)?);

        Ok(Self::new(
            store,
            transport,
            RemoteAddress::new(default_url, preferences),
        ))
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Local override, else cache, else `None`
    pub fn load_preferred(&self) -> Option<LoaderConfig> {
        if let Some(stored) = self.store.read(ConfigSlot::Local) {
            tracing::info!(
                "Loaded local config at {} (version {})",
                self.store.local_path().display(),
                stored.config.version
            );
            return Some(stored.config);
        }

        if let Some(stored) = self.store.read(ConfigSlot::Cache) {
            tracing::info!("Loaded cached config (version {})", stored.config.version);
            return Some(stored.config);
        }

        tracing::info!("No local or cached config available");
        None
    }

    /// Seed the active configuration from [`load_preferred`](Self::load_preferred)
    pub fn initialize(&mut self) -> Option<Arc<LoaderConfig>> {
        self.active = ActiveConfig::new(self.load_preferred());
        self.active.get()
    }

    pub fn active(&self) -> Option<Arc<LoaderConfig>> {
        self.active.get()
    }

    /// A handle for running fetches off the owning task
    pub fn fetcher(&self) -> ConfigFetcher {
        self.fetcher.clone()
    }

    pub async fn fetch_latest(&self) -> FetchOutcome {
        self.fetcher.fetch_latest().await
    }

    /// Apply a fetch outcome to the active configuration.
    ///
    /// Failures keep the current state.
    pub fn apply(&mut self, outcome: FetchOutcome) -> RebuildSignal {
        match outcome {
            Ok(config) => {
                let previous = self.active.version();
                let version = config.version;
                let signal = self.active.replace_if_changed(config);
                match signal {
                    RebuildSignal::Rebuild => {
                        tracing::info!(?previous, version, "Adopted new remote config")
                    }
                    RebuildSignal::NoRebuild => {
                        tracing::debug!(version, "Remote config unchanged")
                    }
                }
                signal
            }
            Err(e) => {
                tracing::warn!("Keeping current config after failed refresh: {}", e);
                RebuildSignal::NoRebuild
            }
        }
    }

    /// Fetch and apply in one step
    pub async fn refresh(&mut self) -> RebuildSignal {
        let outcome = self.fetch_latest().await;
        self.apply(outcome)
    }
}
