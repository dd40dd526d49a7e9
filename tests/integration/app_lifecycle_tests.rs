/*!
 * Controller and on-disk store tests
 */

use std::sync::Arc;
use std::time::Duration;

use latinify::app_config::Config;
use latinify::app_controller::Controller;
use latinify::clock::ManualClock;
use latinify::database::SqliteStore;
use latinify::document::Page;
use latinify::errors::{AppError, RateLimitError, TranslateError};
use latinify::providers::mock::MockProvider;
use latinify::session::ActivationFlags;
use latinify::translation::TranslationCache;

use crate::common::{START_MILLIS, create_temp_dir, create_test_file, latin};

const PAGE_JSON: &str = r#"{
  "tag": "body",
  "children": [
    {"tag": "h1", "children": [{"text": "Latin for everyone"}]},
    {"tag": "p", "children": [{"text": "  Every page can be read in Latin. "}]},
    {"tag": "pre", "children": [{"text": "cargo run"}]},
    {"tag": "div", "style": {"display": "none"}, "children": [{"text": "Hidden banner"}]}
  ]
}"#;

fn controller(db: &std::path::Path, clock: Arc<ManualClock>, provider: &MockProvider) -> Controller {
    let store = SqliteStore::open(db).unwrap();
    Controller::with_components(
        Config::default(),
        Arc::new(store),
        clock,
        Arc::new(provider.clone()),
    )
}

#[tokio::test]
async fn test_translateFile_shouldWriteTranslatedPage() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "page.json", PAGE_JSON).unwrap();
    let provider = MockProvider::working();
    let clock = Arc::new(ManualClock::new(START_MILLIS));
    let controller = controller(&dir.path().join("store.db"), clock, &provider);

    let result = controller.translate_file(&input, None).await.unwrap();

    assert_eq!(result.output_path, dir.path().join("page.la.json"));
    assert_eq!(result.outcome.translated, 2);
    let written = Page::from_json(&std::fs::read_to_string(&result.output_path).unwrap()).unwrap();
    assert!(written.find_text(&latin("Latin for everyone")).is_some());
    assert!(written.find_text("cargo run").is_some());
    assert!(written.find_text("Hidden banner").is_some());
}

#[tokio::test]
async fn test_sqliteStore_shouldPersistCacheAndRateLimitAcrossRestarts() {
    let dir = create_temp_dir().unwrap();
    let db = dir.path().join("store.db");
    let input = create_test_file(dir.path(), "page.json", PAGE_JSON).unwrap();
    let output = dir.path().join("out.json");
    let provider = MockProvider::working();
    let clock = Arc::new(ManualClock::new(START_MILLIS));

    controller(&db, clock.clone(), &provider)
        .translate_file(&input, Some(&output))
        .await
        .unwrap();

    // A fresh controller over the same file sees the committed pass
    let restarted = controller(&db, clock.clone(), &provider);
    assert_eq!(restarted.rate_limit_status().await.unwrap().state.count, 1);
    match restarted.translate_file(&input, Some(&output)).await {
        Err(AppError::Translation(TranslateError::RateLimit(
            RateLimitError::CooldownActive { .. },
        ))) => {}
        other => panic!("expected cooldown, got {:?}", other.map(|r| r.outcome)),
    }

    clock.advance(Duration::from_secs(10));
    let again = restarted.translate_file(&input, Some(&output)).await.unwrap();
    assert_eq!(again.outcome.cache.hits, 2);
    assert_eq!(provider.call_count(), 1);

    let report = restarted.cache_report().await.unwrap();
    assert_eq!((report.purged, report.stats.entries), (0, 2));
}

#[tokio::test]
async fn test_cacheReport_afterTtl_shouldPurge() {
    let dir = create_temp_dir().unwrap();
    let db = dir.path().join("store.db");
    let clock = Arc::new(ManualClock::new(START_MILLIS));
    let store = Arc::new(SqliteStore::open(&db).unwrap());
    let mut cache = TranslationCache::new(store, clock.clone(), Duration::from_secs(60));
    cache.set("Hello", "Salve");
    cache.flush().await.unwrap();

    clock.advance(Duration::from_secs(24 * 60 * 60));
    let report = controller(&db, clock, &MockProvider::working())
        .cache_report()
        .await
        .unwrap();

    assert_eq!((report.purged, report.stats.entries), (1, 0));
}

#[tokio::test]
async fn test_translateFile_shouldClearActivationFlagWhenDone() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "page.json", PAGE_JSON).unwrap();
    let db = dir.path().join("store.db");
    let clock = Arc::new(ManualClock::new(START_MILLIS));
    let controller = controller(&db, clock, &MockProvider::working());

    controller.translate_file(&input, None).await.unwrap();

    let count = SqliteStore::open(&db).unwrap().connection().key_count().unwrap();
    // Cache and rate-limit state remain; no tab flag is left behind
    assert_eq!(count, 2);
    let flags = ActivationFlags::new(controller.services().store().clone());
    assert!(!flags.is_active("anything").await.unwrap());
}

#[tokio::test]
async fn test_translateFile_withInvalidPage_shouldFailWithFileError() {
    let dir = create_temp_dir().unwrap();
    let input = create_test_file(dir.path(), "page.json", "not json").unwrap();
    let clock = Arc::new(ManualClock::new(START_MILLIS));
    let controller = controller(&dir.path().join("store.db"), clock, &MockProvider::working());

    let result = controller.translate_file(&input, None).await;

    assert!(matches!(result, Err(AppError::File(_))));
}
