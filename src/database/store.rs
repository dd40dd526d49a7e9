/*!
 * Key-value store implementations.
 */

use async_trait::async_trait;
use log::debug;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

use super::KeyValueStore;
use super::connection::DatabaseConnection;
use crate::errors::StoreError;

/// SQLite-backed store; values are kept as JSON text
#[derive(Debug, Clone)]
pub struct SqliteStore {
    db: DatabaseConnection,
}

impl SqliteStore {
    /// Wrap an existing connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Open (or create) a store file
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Ok(Self::new(DatabaseConnection::new(path)?))
    }

    /// Open the store at the default location
    pub fn open_default() -> Result<Self, StoreError> {
        Ok(Self::new(DatabaseConnection::new_default()?))
    }

    /// Store backed by an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self, StoreError> {
        Ok(Self::new(DatabaseConnection::new_in_memory()?))
    }

    /// Underlying connection
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl KeyValueStore for SqliteStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let keys = keys.iter().map(|k| k.to_string()).collect();

        self.db
            .read_values(keys)
            .await?
            .into_iter()
            .map(|(key, text)| match serde_json::from_str(&text) {
                Ok(value) => Ok((key, value)),
                Err(source) => Err(StoreError::Corrupt { key, source }),
            })
            .collect()
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError> {
        let rows = items
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        self.db.write_values(rows).await?;
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let keys = keys.iter().map(|k| k.to_string()).collect();
        let removed = self.db.delete_values(keys).await?;
        debug!("Removed {} key(s)", removed);
        Ok(())
    }
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError> {
        let values = self.values.read();
        Ok(keys
            .iter()
            .filter_map(|key| values.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError> {
        self.values.write().extend(items);
        Ok(())
    }

    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError> {
        let mut values = self.values.write();
        for key in keys {
            values.remove(*key);
        }
        Ok(())
    }
}
