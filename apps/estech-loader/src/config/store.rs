//! Slot-based configuration storage
//!
//! Three independent slots can hold a configuration document:
//!
//! - **Local**: override file deployed by IT. Read-only.
//! - **Cache**: last remote document that decoded. The only writable slot.
//! - **Remote**: the body of the most recent fetch, kept in memory only.
//!
//! Reads never fail. A missing or unreadable resource reads as absent, and an
//! undecodable one keeps its raw bytes so the caller can log them.

use super::model::{body_snippet, LoaderConfig};
use crate::error::{LoaderError, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;

/// One of the three configuration sources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigSlot {
    Local,
    Cache,
    Remote,
}

impl std::fmt::Display for ConfigSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSlot::Local => write!(f, "local"),
            ConfigSlot::Cache => write!(f, "cache"),
            ConfigSlot::Remote => write!(f, "remote"),
        }
    }
}

/// A decoded document together with the bytes it was decoded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredConfig {
    pub config: LoaderConfig,
    pub raw: Vec<u8>,
}

/// Detailed result of reading a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotContents {
    /// Nothing stored, or the backing resource could not be read
    Absent,
    /// Bytes are present but are not a configuration document
    Undecodable { raw: Vec<u8>, error: String },
    Decoded(StoredConfig),
}

impl SlotContents {
    fn decode(raw: Vec<u8>) -> Self {
        match LoaderConfig::from_slice(&raw) {
            Ok(config) => SlotContents::Decoded(StoredConfig { config, raw }),
            Err(e) => SlotContents::Undecodable {
                raw,
                error: e.to_string(),
            },
        }
    }
}

/// File-backed store for the local and cache slots plus the in-memory remote slot
#[derive(Debug)]
pub struct ConfigStore {
    local_path: PathBuf,
    cache_path: PathBuf,
    remote: RwLock<Option<Vec<u8>>>,
}

impl ConfigStore {
    pub fn new(local_path: impl Into<PathBuf>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            cache_path: cache_path.into(),
            remote: RwLock::new(None),
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// Read a slot, returning the decoded document if there is one.
    ///
    /// Undecodable content is logged with a bounded snippet and reads as `None`.
    pub fn read(&self, slot: ConfigSlot) -> Option<StoredConfig> {
        match self.read_detailed(slot) {
            SlotContents::Decoded(stored) => Some(stored),
            SlotContents::Undecodable { raw, error } => {
                tracing::warn!(
                    %slot,
                    "Ignoring undecodable config ({}); body starts with {:?}",
                    error,
                    body_snippet(&raw)
                );
                None
            }
            SlotContents::Absent => None,
        }
    }

    /// Read a slot without discarding undecodable bytes
    pub fn read_detailed(&self, slot: ConfigSlot) -> SlotContents {
        match slot {
            ConfigSlot::Local => read_file(&self.local_path, slot),
            ConfigSlot::Cache => read_file(&self.cache_path, slot),
            ConfigSlot::Remote => {
                let guard = self.remote.read().unwrap_or_else(|e| e.into_inner());
                match guard.as_ref() {
                    Some(raw) => SlotContents::decode(raw.clone()),
                    None => SlotContents::Absent,
                }
            }
        }
    }

    /// Atomically replace the cache slot with `raw`.
    ///
    /// The bytes are written to a temporary file in the cache directory and
    /// renamed over the old file, so readers see either the previous document
    /// or the new one. On failure the previous document is left intact.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is not [`ConfigSlot::Cache`]; the other slots are
    /// read-only and writing to them is a programming error.
    pub fn write(&self, slot: ConfigSlot, raw: &[u8]) -> Result<()> {
        assert_eq!(
            slot,
            ConfigSlot::Cache,
            "only the cache slot is writable (attempted write to {slot})"
        );

        let dir = self
            .cache_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(dir).map_err(LoaderError::CacheWrite)?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(LoaderError::CacheWrite)?;
        tmp.write_all(raw).map_err(LoaderError::CacheWrite)?;
        tmp.as_file().sync_all().map_err(LoaderError::CacheWrite)?;
        tmp.persist(&self.cache_path)
            .map_err(|e| LoaderError::CacheWrite(e.error))?;

        tracing::debug!("Wrote {} bytes to cache {}", raw.len(), self.cache_path.display());
        Ok(())
    }

    /// Remember the body of the latest fetch in the remote slot
    pub(crate) fn record_remote(&self, raw: &[u8]) {
        let mut guard = self.remote.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(raw.to_vec());
    }
}

fn read_file(path: &Path, slot: ConfigSlot) -> SlotContents {
    match fs::read(path) {
        Ok(raw) => SlotContents::decode(raw),
        Err(e) if e.kind() == ErrorKind::NotFound => SlotContents::Absent,
        Err(e) => {
            let err = match slot {
                ConfigSlot::Local => LoaderError::LocalRead(e.to_string()),
                _ => LoaderError::Io(e),
            };
            tracing::warn!(%slot, "Treating {} as absent: {}", path.display(), err);
            SlotContents::Absent
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn doc(version: i64) -> Vec<u8> {
        format!(r#"{{"version": {version}, "items": [{{"title": "Safari", "command": "safari"}}]}}"#)
            .into_bytes()
    }

    fn store_in(dir: &Path) -> ConfigStore {
        ConfigStore::new(dir.join("local/loader-config.json"), dir.join("cache/loader-config.json"))
    }

    #[test]
    fn test_missing_files_read_as_absent() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        assert_eq!(store.read_detailed(ConfigSlot::Local), SlotContents::Absent);
        assert!(store.read(ConfigSlot::Cache).is_none());
        assert!(store.read(ConfigSlot::Remote).is_none());
    }

    #[test]
    fn test_write_then_read_cache() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.write(ConfigSlot::Cache, &doc(2)).unwrap();

        let stored = store.read(ConfigSlot::Cache).unwrap();
        assert_eq!(stored.config.version, 2);
        assert_eq!(stored.raw, doc(2));
    }

    #[test]
    fn test_write_replaces_previous_cache() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.write(ConfigSlot::Cache, &doc(2)).unwrap();
        store.write(ConfigSlot::Cache, &doc(3)).unwrap();

        assert_eq!(store.read(ConfigSlot::Cache).unwrap().config.version, 3);
        let leftovers = fs::read_dir(dir.path().join("cache")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn test_failed_write_keeps_previous_cache() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        store.write(ConfigSlot::Cache, &doc(2)).unwrap();

        // A directory where the rename target should be makes persist fail
        let blocked = ConfigStore::new(dir.path().join("unused"), dir.path().join("cache"));
        assert!(matches!(
            blocked.write(ConfigSlot::Cache, &doc(9)),
            Err(LoaderError::CacheWrite(_))
        ));

        assert_eq!(store.read(ConfigSlot::Cache).unwrap().config.version, 2);
    }

    #[test]
    fn test_undecodable_keeps_raw_bytes() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        fs::create_dir_all(dir.path().join("local")).unwrap();
        fs::write(store.local_path(), b"{ not json").unwrap();

        match store.read_detailed(ConfigSlot::Local) {
            SlotContents::Undecodable { raw, .. } => assert_eq!(raw, b"{ not json"),
            other => panic!("Unexpected contents: {other:?}"),
        }
        assert!(store.read(ConfigSlot::Local).is_none());
    }

    #[test]
    fn test_remote_slot_holds_last_body() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());

        store.record_remote(&doc(5));
        assert_eq!(store.read(ConfigSlot::Remote).unwrap().config.version, 5);

        store.record_remote(b"<html>not json</html>");
        assert!(matches!(
            store.read_detailed(ConfigSlot::Remote),
            SlotContents::Undecodable { .. }
        ));
    }

    #[test]
    #[should_panic(expected = "only the cache slot is writable")]
    fn test_write_to_local_is_a_contract_violation() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let _ = store.write(ConfigSlot::Local, &doc(1));
    }

    #[test]
    #[should_panic(expected = "only the cache slot is writable")]
    fn test_write_to_remote_is_a_contract_violation() {
        let dir = tempdir().unwrap();
        let store = store_in(dir.path());
        let _ = store.write(ConfigSlot::Remote, &doc(1));
    }
}
