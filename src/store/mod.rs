//! Key store abstraction.
//!
//! The room validator asks a key store whether `channel:<name>` exists. The
//! store is an external dependency; backends only need to answer existence
//! queries and accept registrations.

use crate::error::StoreError;
use async_trait::async_trait;

pub mod memory;
pub mod redb;

pub use memory::MemoryStore;
pub use self::redb::RedbStore;

#[async_trait]
pub trait KeyStore: Send + Sync {
    /// Whether `key` is registered.
    async fn exists(&self, key: &str) -> Result<bool, StoreError>;

    /// Register `key`. Registering twice is not an error.
    async fn insert(&self, key: &str) -> Result<(), StoreError>;

    /// Unregister `key`. Returns whether it was present.
    async fn remove(&self, key: &str) -> Result<bool, StoreError>;
}
