/*!
 * Tests for error classification and user-facing messages
 */

use latinify::errors::{ProviderError, RateLimitError, TranslateError};

#[test]
fn test_fromStatus_shouldClassifyByStatusAndMessage() {
    assert!(matches!(
        ProviderError::from_status(429, "Too many requests"),
        ProviderError::QuotaExceeded { .. }
    ));
    assert!(matches!(
        ProviderError::from_status(403, "This API method requires billing to be enabled."),
        ProviderError::BillingDisabled { .. }
    ));
    assert!(matches!(
        ProviderError::from_status(403, "API key not valid. Please pass a valid API key."),
        ProviderError::ApiKeyRestricted { .. }
    ));
    assert!(matches!(
        ProviderError::from_status(403, "Requests from referer <empty> are blocked."),
        ProviderError::ApiKeyRestricted { .. }
    ));
    assert!(matches!(
        ProviderError::from_status(403, "Forbidden"),
        ProviderError::AccessDenied { .. }
    ));
    assert!(matches!(
        ProviderError::from_status(400, "Invalid Value"),
        ProviderError::BadRequest { .. }
    ));
    assert_eq!(
        ProviderError::from_status(503, "Backend unavailable"),
        ProviderError::Unknown {
            status: Some(503),
            message: "Backend unavailable".to_string()
        }
    );
}

#[test]
fn test_providerError_display_shouldHideRawMessage() {
    let error = ProviderError::from_status(403, "billing account abc-123 is closed");

    assert_eq!(error.to_string(), "Billing not enabled");
    assert_eq!(error.raw_message(), "billing account abc-123 is closed");
    assert_eq!(error.status(), Some(403));
}

#[test]
fn test_rateLimitError_shouldStateWait() {
    let error = TranslateError::from(RateLimitError::CooldownActive { wait_seconds: 3 });

    assert_eq!(error.to_string(), "Rate limit: please wait 3 seconds");
    assert_eq!(error.user_message(), "Please wait");
}

#[test]
fn test_userMessage_shouldMapEveryProviderClass() {
    let cases = [
        (429, "", "Quota exceeded"),
        (403, "billing", "Enable billing in Google Cloud"),
        (403, "API key", "API key issue"),
        (403, "nope", "API access denied"),
        (400, "bad", "Error occurred"),
        (500, "boom", "Error occurred"),
    ];
    for (status, message, expected) in cases {
        let error = TranslateError::from(ProviderError::from_status(status, message));
        assert_eq!(error.user_message(), expected, "status {}", status);
    }

    let network = TranslateError::from(ProviderError::Network {
        message: "dns".to_string(),
    });
    assert_eq!(network.user_message(), "Check connection");
}
