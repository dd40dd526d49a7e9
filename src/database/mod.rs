/*!
 * Persistent key-value storage for translation state.
 *
 * This module provides the store shared by every page:
 * - the translation cache
 * - the rate-limit state
 * - per-document activation flags
 *
 * `SqliteStore` persists to disk; `MemoryStore` keeps everything in process.
 */

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt::Debug;

use crate::errors::StoreError;

pub mod connection;
pub mod schema;
pub mod store;

// Re-export main types
pub use connection::DatabaseConnection;
pub use store::{MemoryStore, SqliteStore};

/// Key-value store holding JSON values.
///
/// Each call is atomic on its own. A read followed by a write is not.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Fetch the values present for `keys`; missing keys are absent from the map
    async fn get(&self, keys: &[&str]) -> Result<HashMap<String, Value>, StoreError>;

    /// Insert or replace every entry of `items`
    async fn set(&self, items: HashMap<String, Value>) -> Result<(), StoreError>;

    /// Delete `keys`; unknown keys are ignored
    async fn remove(&self, keys: &[&str]) -> Result<(), StoreError>;
}

/// Read and decode a single value
pub async fn load_value<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    let mut values = store.get(&[key]).await?;
    match values.remove(key) {
        Some(Value::Null) | None => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|source| StoreError::Corrupt {
                key: key.to_string(),
                source,
            }),
    }
}

/// Encode and write a single value
pub async fn save_value<T: Serialize>(
    store: &dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let encoded = serde_json::to_value(value).map_err(|source| StoreError::Encode {
        key: key.to_string(),
        source,
    })?;
    store
        .set(HashMap::from([(key.to_string(), encoded)]))
        .await
}
