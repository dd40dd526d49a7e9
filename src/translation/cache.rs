/*!
 * Translation caching functionality.
 *
 * This module provides the persistent, TTL-bounded cache mapping source text
 * to its translation. A pass loads the persisted map once, works on the
 * in-memory copy and flushes it back before it concludes.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, duration_millis};
use crate::database::{KeyValueStore, load_value, save_value};
use crate::errors::StoreError;

/// Store key holding the whole cache map
pub const CACHE_STORAGE_KEY: &str = "latinify_cache";

/// One cached translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Translated text
    pub translation: String,

    /// When the entry was stored, in epoch milliseconds
    #[serde(rename = "timestamp")]
    pub stored_at: i64,
}

impl CacheEntry {
    /// Whether the entry is still inside its time-to-live at `now`
    pub fn is_valid(&self, now: i64, ttl_millis: i64) -> bool {
        now.saturating_sub(self.stored_at) < ttl_millis
    }
}

/// Hit and miss counters for one cache instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
    pub entries: usize,
}

impl CacheStats {
    /// Hit rate as a percentage
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64 * 100.0
        }
    }
}

/// Translation cache for storing and retrieving translations
#[derive(Debug)]
pub struct TranslationCache {
    /// Backing store
    store: Arc<dyn KeyValueStore>,

    /// Time source for entry timestamps
    clock: Arc<dyn Clock>,

    /// Maximum entry age in milliseconds
    ttl_millis: i64,

    /// In-memory copy of the persisted map
    entries: HashMap<String, CacheEntry>,

    /// Cache hit counter
    hits: usize,

    /// Cache miss counter
    misses: usize,
}

impl TranslationCache {
    /// Create an empty cache; call `load` to read the persisted entries
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            store,
            clock,
            ttl_millis: duration_millis(ttl),
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Read the persisted map and purge expired entries.
    ///
    /// The purged map is written back only when something was removed.
    /// Returns the number of purged entries.
    pub async fn load(&mut self) -> Result<usize, StoreError> {
        let stored: HashMap<String, CacheEntry> =
            load_value(self.store.as_ref(), CACHE_STORAGE_KEY)
                .await?
                .unwrap_or_default();

        let now = self.clock.now_millis();
        let before = stored.len();
        self.entries = stored
            .into_iter()
            .filter(|(_, entry)| entry.is_valid(now, self.ttl_millis))
            .collect();
        let purged = before - self.entries.len();

        if purged > 0 {
            debug!("Purged {} expired cache entries", purged);
            self.flush().await?;
        }

        debug!("Loaded {} cache entries", self.entries.len());
        Ok(purged)
    }

    /// Valid cached translation for `text`
    pub fn get(&mut self, text: &str) -> Option<String> {
        let now = self.clock.now_millis();
        match self.entries.get(text) {
            Some(entry) if entry.is_valid(now, self.ttl_millis) => {
                self.hits += 1;
                debug!("Cache hit for '{}'", truncate_text(text, 30));
                Some(entry.translation.clone())
            }
            _ => {
                self.misses += 1;
                debug!("Cache miss for '{}'", truncate_text(text, 30));
                None
            }
        }
    }

    /// Store `translation` for `text` at the current time, replacing any prior entry
    pub fn set(&mut self, text: impl Into<String>, translation: impl Into<String>) {
        let entry = CacheEntry {
            translation: translation.into(),
            stored_at: self.clock.now_millis(),
        };
        self.entries.insert(text.into(), entry);
    }

    /// Persist the in-memory map
    pub async fn flush(&self) -> Result<(), StoreError> {
        save_value(self.store.as_ref(), CACHE_STORAGE_KEY, &self.entries).await
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.entries.len(),
        }
    }
}

/// Truncate text for log lines
fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let prefix: String = text.chars().take(max_chars).collect();
        format!("{}...", prefix)
    }
}
