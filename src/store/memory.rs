//! Process-local key store.

use super::KeyStore;
use crate::error::StoreError;
use async_trait::async_trait;
use dashmap::DashSet;

/// In-memory [`KeyStore`]; contents are lost on exit.
#[derive(Debug, Default)]
pub struct MemoryStore {
    keys: DashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for MemoryStore {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            keys: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl KeyStore for MemoryStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.keys.contains(key))
    }

    async fn insert(&self, key: &str) -> Result<(), StoreError> {
        self.keys.insert(key.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.keys.remove(key).is_some())
    }
}
