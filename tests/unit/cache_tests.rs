/*!
 * Tests for translation cache functionality
 */

use std::sync::Arc;
use std::time::Duration;

use latinify::clock::{Clock, ManualClock};
use latinify::database::{MemoryStore, load_value, save_value};
use latinify::translation::cache::{CACHE_STORAGE_KEY, CacheEntry, TranslationCache};
use std::collections::HashMap;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn setup() -> (Arc<MemoryStore>, Arc<ManualClock>) {
    (Arc::new(MemoryStore::new()), Arc::new(ManualClock::new(1_000_000)))
}

#[tokio::test]
async fn test_cache_set_shouldReturnStoredTranslation() {
    let (store, clock) = setup();
    let mut cache = TranslationCache::new(store, clock, DAY);

    cache.set("hello", "salve");

    assert_eq!(cache.get("hello"), Some("salve".to_string()));
    assert_eq!(cache.get("Hello"), None);
    let stats = cache.stats();
    assert_eq!((stats.hits, stats.misses), (1, 1));
}

#[tokio::test]
async fn test_cache_set_shouldOverwritePriorEntry() {
    let (store, clock) = setup();
    let mut cache = TranslationCache::new(store, clock, DAY);

    cache.set("hello", "salve");
    cache.set("hello", "ave");

    assert_eq!(cache.get("hello"), Some("ave".to_string()));
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn test_cache_flush_shouldPersistAcrossInstances() {
    let (store, clock) = setup();
    let mut first = TranslationCache::new(store.clone(), clock.clone(), DAY);
    first.set("hello", "salve");
    first.flush().await.unwrap();

    let mut second = TranslationCache::new(store, clock, DAY);
    assert_eq!(second.load().await.unwrap(), 0);
    assert_eq!(second.get("hello"), Some("salve".to_string()));
}

#[tokio::test]
async fn test_cache_get_afterTtl_shouldMiss() {
    let (store, clock) = setup();
    let mut cache = TranslationCache::new(store, clock.clone(), DAY);
    cache.set("hello", "salve");

    clock.advance(DAY - Duration::from_millis(1));
    assert!(cache.get("hello").is_some());

    clock.advance(Duration::from_millis(1));
    assert!(cache.get("hello").is_none());
}

#[tokio::test]
async fn test_cache_load_shouldPurgeExpiredAndPersist() {
    let (store, clock) = setup();
    let now = clock.now_millis();
    let ttl_millis = DAY.as_millis() as i64;
    let stored = HashMap::from([
        (
            "old".to_string(),
            CacheEntry { translation: "vetus".to_string(), stored_at: now - ttl_millis },
        ),
        (
            "fresh".to_string(),
            CacheEntry { translation: "recens".to_string(), stored_at: now - 1 },
        ),
    ]);
    save_value(store.as_ref(), CACHE_STORAGE_KEY, &stored).await.unwrap();

    let mut cache = TranslationCache::new(store.clone(), clock, DAY);
    assert_eq!(cache.load().await.unwrap(), 1);
    assert_eq!(cache.len(), 1);

    let persisted: HashMap<String, CacheEntry> =
        load_value(store.as_ref(), CACHE_STORAGE_KEY).await.unwrap().unwrap();
    assert!(persisted.contains_key("fresh"));
    assert!(!persisted.contains_key("old"));
}

#[tokio::test]
async fn test_cache_load_withNothingExpired_shouldNotWrite() {
    let (store, clock) = setup();
    let mut cache = TranslationCache::new(store.clone(), clock, DAY);

    assert_eq!(cache.load().await.unwrap(), 0);
    assert!(cache.is_empty());
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_cache_load_withCorruptValue_shouldFail() {
    let (store, clock) = setup();
    save_value(store.as_ref(), CACHE_STORAGE_KEY, &"not a map").await.unwrap();

    let mut cache = TranslationCache::new(store, clock, DAY);
    assert!(cache.load().await.is_err());
}
