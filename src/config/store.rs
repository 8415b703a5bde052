//! Room key store configuration.

use serde::Deserialize;

use super::defaults::default_store_path;

/// Which [`crate::store::KeyStore`] backend answers room existence queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// Process-local set, seeded from `rooms`.
    #[default]
    Memory,
    /// Embedded redb database at `path`.
    Redb,
}

/// Room key store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Path to the redb file (redb backend only).
    #[serde(default = "default_store_path")]
    pub path: String,
    /// Room names registered in the store at startup.
    #[serde(default)]
    pub rooms: Vec<String>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
            rooms: Vec::new(),
        }
    }
}
