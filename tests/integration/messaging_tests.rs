/*!
 * Tests for the request/response channel
 */

use std::sync::Arc;

use latinify::messaging::{MessageHandler, Request, Response, dispatch_json};
use latinify::providers::mock::MockProvider;
use latinify::translation::BatchTranslator;

use crate::common::{Harness, latin, sample_page};

fn decode(raw: &str) -> Response {
    serde_json::from_str(raw).unwrap()
}

#[tokio::test]
async fn test_translateMessage_shouldReportTranslatedCount() {
    let harness = Harness::new();
    let translator = harness.translator("tab-1", sample_page());

    let response = decode(&dispatch_json(&translator, r#"{"action":"translate"}"#).await);

    assert!(response.success);
    assert_eq!(response.translated, Some(3));
    assert!(response.error.is_none());
}

#[tokio::test]
async fn test_translateMessage_withinCooldown_shouldCarryError() {
    let harness = Harness::new();
    let translator = harness.translator("tab-1", sample_page());
    translator.translate().await.unwrap();
    translator.restore().await.unwrap();

    let response = translator.handle(Request::Translate).await;

    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Rate limit: please wait 5 seconds")
    );
    assert_eq!(response.message.as_deref(), Some("Please wait"));
}

#[tokio::test]
async fn test_restoreMessage_shouldAlwaysSucceed() {
    let harness = Harness::new();
    let translator = harness.translator("tab-1", sample_page());

    let response = translator.handle(Request::Restore).await;

    assert_eq!(response, Response::ok());
}

#[tokio::test]
async fn test_translateTextsMessage_shouldReturnTranslations() {
    let provider = MockProvider::working();
    let background = BatchTranslator::new(Arc::new(provider.clone()), 100, "la");

    let raw = dispatch_json(
        &background,
        r#"{"action":"translateTexts","texts":["Hello","World","Hello"]}"#,
    )
    .await;
    let response = decode(&raw);

    assert!(response.success);
    let translations = response.translations.unwrap();
    assert_eq!(translations.len(), 2);
    assert_eq!(translations["World"], latin("World"));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_translateTextsMessage_withProviderError_shouldClassify() {
    let background = BatchTranslator::new(
        Arc::new(MockProvider::failing(403).with_error_message("API key not valid")),
        100,
        "la",
    );

    let response = background
        .handle(Request::TranslateTexts {
            texts: vec!["Hello".to_string()],
        })
        .await;

    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("API key restricted - check referrer settings")
    );
    assert_eq!(response.message.as_deref(), Some("API key issue"));
}

#[tokio::test]
async fn test_dispatch_withWrongSide_shouldRejectAction() {
    let harness = Harness::new();
    let translator = harness.translator("tab-1", sample_page());

    let response = decode(&dispatch_json(&translator, r#"{"action":"translateTexts","texts":[]}"#).await);

    assert!(!response.success);
    assert_eq!(
        response.error.as_deref(),
        Some("Unsupported action: translateTexts")
    );
}

#[tokio::test]
async fn test_dispatch_withMalformedJson_shouldNotPanic() {
    let background = BatchTranslator::new(Arc::new(MockProvider::working()), 100, "la");

    for raw in ["", "{}", r#"{"action":"dance"}"#, "[1,2]"] {
        let response = decode(&dispatch_json(&background, raw).await);
        assert!(!response.success);
        assert!(response.error.unwrap().starts_with("Invalid message"));
    }
}
