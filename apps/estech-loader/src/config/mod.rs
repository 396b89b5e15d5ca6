//! Configuration loading, caching and remote refresh
//!
//! - [`model`]: the JSON document shared by all slots
//! - [`store`]: the local, cache and remote slots
//! - [`remote`]: HTTP transport and remote-address resolution
//! - [`sync`]: the engine that reconciles the slots with the active configuration

pub mod model;
pub mod remote;
pub mod store;
pub mod sync;

pub use model::{LoaderConfig, LoaderItem};
pub use store::{ConfigSlot, ConfigStore, SlotContents, StoredConfig};
pub use sync::{ConfigFetcher, ConfigSyncEngine, FetchOutcome, RebuildSignal};
