//! Redb-backed persistent key store.
//!
//! Keys live in a single `keys` table mapping the key to the Unix time it was
//! registered. The table is created by the first insert; until then every
//! lookup answers "absent".

use super::KeyStore;
use crate::error::StoreError;
use async_trait::async_trait;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, TableError};
use std::path::Path;
use std::sync::Arc;

const KEYS_TABLE: TableDefinition<&str, i64> = TableDefinition::new("keys");

pub struct RedbStore {
    db: Arc<Database>,
}

impl RedbStore {
    /// Open the database at `path`, creating it if needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let db = Database::create(path.as_ref()).map_err(backend)?;
        Ok(Self { db: Arc::new(db) })
    }
}

fn backend(e: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl KeyStore for RedbStore {
    async fn exists(&self, key: &str) -> Result<bool, StoreError> {
        let read_txn = self.db.begin_read().map_err(backend)?;
        let table = match read_txn.open_table(KEYS_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(false),
            Err(e) => return Err(backend(e)),
        };
        let found = table.get(key).map_err(backend)?.is_some();
        Ok(found)
    }

    async fn insert(&self, key: &str) -> Result<(), StoreError> {
        let registered = chrono::Utc::now().timestamp();

        let write_txn = self.db.begin_write().map_err(backend)?;
        {
            let mut table = write_txn.open_table(KEYS_TABLE).map_err(backend)?;
            table.insert(key, registered).map_err(backend)?;
        }
        write_txn.commit().map_err(backend)?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, StoreError> {
        let write_txn = self.db.begin_write().map_err(backend)?;
        let removed = {
            let mut table = write_txn.open_table(KEYS_TABLE).map_err(backend)?;
            let previous = table.remove(key).map_err(backend)?;
            previous.is_some()
        };
        write_txn.commit().map_err(backend)?;
        Ok(removed)
    }
}
