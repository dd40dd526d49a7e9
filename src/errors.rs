/*!
 * Error types for the latinify library.
 *
 * This module contains custom error types for the different parts of a
 * translation pass, using the thiserror crate for ergonomic error definitions.
 * Every failure is scoped to a single pass; none of them is fatal to the host.
 */

use thiserror::Error;

/// Errors raised locally by the rate limiter, before any network call is made
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RateLimitError {
    /// The previous successful pass finished less than one cooldown ago
    #[error("Rate limit: please wait {wait_seconds} seconds")]
    CooldownActive {
        /// Whole seconds until the cooldown elapses (rounded up)
        wait_seconds: u64,
    },

    /// The hourly quota of successful passes is used up for the current window
    #[error("Rate limit: maximum translations per hour reached")]
    HourlyQuotaExceeded,
}

/// Classified failures of the remote translation provider.
///
/// The `Display` text is the short classification shown to users. The raw
/// provider message is kept alongside for logging only.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// HTTP 429
    #[error("API rate limit exceeded")]
    QuotaExceeded { message: String },

    /// HTTP 403 mentioning billing
    #[error("Billing not enabled")]
    BillingDisabled { message: String },

    /// HTTP 403 mentioning the API key or referrer restrictions
    #[error("API key restricted - check referrer settings")]
    ApiKeyRestricted { message: String },

    /// Any other HTTP 403
    #[error("API access denied")]
    AccessDenied { message: String },

    /// HTTP 400
    #[error("API request error")]
    BadRequest { message: String },

    /// The request never produced an HTTP response
    #[error("Network error while contacting the translation API")]
    Network { message: String },

    /// The response could not be parsed or did not match the submitted batch
    #[error("Invalid response from translation API")]
    MalformedResponse { message: String },

    /// Every other provider failure
    #[error("Translation API error")]
    Unknown {
        status: Option<u16>,
        message: String,
    },
}

impl ProviderError {
    /// Classify a provider failure from its HTTP status and raw message
    pub fn from_status(status: u16, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            429 => Self::QuotaExceeded { message },
            403 => {
                let lowered = message.to_lowercase();
                if lowered.contains("billing") {
                    Self::BillingDisabled { message }
                } else if lowered.contains("api key") || lowered.contains("referer") {
                    Self::ApiKeyRestricted { message }
                } else {
                    Self::AccessDenied { message }
                }
            }
            400 => Self::BadRequest { message },
            other => Self::Unknown {
                status: Some(other),
                message,
            },
        }
    }

    /// The raw message reported by the provider
    pub fn raw_message(&self) -> &str {
        match self {
            Self::QuotaExceeded { message }
            | Self::BillingDisabled { message }
            | Self::ApiKeyRestricted { message }
            | Self::AccessDenied { message }
            | Self::BadRequest { message }
            | Self::Network { message }
            | Self::MalformedResponse { message }
            | Self::Unknown { message, .. } => message,
        }
    }

    /// The HTTP status associated with this failure, when there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::QuotaExceeded { .. } => Some(429),
            Self::BillingDisabled { .. } | Self::ApiKeyRestricted { .. } | Self::AccessDenied { .. } => {
                Some(403)
            }
            Self::BadRequest { .. } => Some(400),
            Self::Unknown { status, .. } => *status,
            Self::Network { .. } | Self::MalformedResponse { .. } => None,
        }
    }
}

/// Errors from the persistent key-value store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The storage backend failed
    #[error("Storage backend error: {0}")]
    Backend(String),

    /// A persisted value could not be decoded into the expected shape
    #[error("Corrupt stored value for '{key}': {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// A value could not be encoded for storage
    #[error("Failed to encode value for '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl From<anyhow::Error> for StoreError {
    fn from(error: anyhow::Error) -> Self {
        Self::Backend(format!("{:#}", error))
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(error: rusqlite::Error) -> Self {
        Self::Backend(error.to_string())
    }
}

/// Errors from reading or writing a document's text fragments
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The fragment was removed from the document after it was discovered
    #[error("Text fragment is no longer attached to the document")]
    Detached,

    /// The node exists but does not hold text
    #[error("Node is not a text fragment")]
    NotText,

    /// The node handle does not belong to this document
    #[error("Unknown node handle")]
    UnknownNode,
}

/// Errors that abort a translate or restore operation
#[derive(Error, Debug)]
pub enum TranslateError {
    /// Rejected by the rate limiter
    #[error(transparent)]
    RateLimit(#[from] RateLimitError),

    /// The provider failed for one of the batches
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Reading or writing persisted state failed
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Another translate or restore is running on the same document
    #[error("A translate or restore operation is already in progress for this document")]
    Busy,
}

impl TranslateError {
    /// Short status line for the toggle UI
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::RateLimit(_) | Self::Busy => "Please wait",
            Self::Provider(ProviderError::BillingDisabled { .. }) => "Enable billing in Google Cloud",
            Self::Provider(ProviderError::ApiKeyRestricted { .. }) => "API key issue",
            Self::Provider(ProviderError::AccessDenied { .. }) => "API access denied",
            Self::Provider(ProviderError::QuotaExceeded { .. }) => "Quota exceeded",
            Self::Provider(ProviderError::Network { .. }) => "Check connection",
            Self::Provider(_) | Self::Storage(_) => "Error occurred",
        }
    }
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error from a translation pass
    #[error("Translation error: {0}")]
    Translation(#[from] TranslateError),

    /// Error from the persistent store outside a pass
    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
