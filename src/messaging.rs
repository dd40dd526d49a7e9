/*!
 * Message channel between the page, the toggle UI and the background worker.
 *
 * Requests are JSON objects tagged by `action`:
 * - `{"action": "translate"}` and `{"action": "restore"}` go to the page side
 * - `{"action": "translateTexts", "texts": [...]}` goes to the background side
 *
 * Every request gets a response; failures are reported in it, never thrown.
 */

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::document::DocumentTree;
use crate::errors::TranslateError;
use crate::translation::{BatchTranslator, PageTranslator};

/// Request sent over the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    /// Translate the page
    Translate,
    /// Put the page back to its original text
    Restore,
    /// Translate raw texts through the provider
    TranslateTexts { texts: Vec<String> },
}

impl Request {
    fn action(&self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::Restore => "restore",
            Self::TranslateTexts { .. } => "translateTexts",
        }
    }
}

/// Response to a request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Response {
    pub success: bool,

    /// Fragments translated by a page pass
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translated: Option<usize>,

    /// Source text to translation, for `translateTexts`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub translations: Option<HashMap<String, String>>,

    /// Short status line for the UI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Error description when `success` is false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Failed pass, with the UI status line alongside the error
    pub fn from_error(error: &TranslateError) -> Self {
        Self {
            message: Some(error.user_message().to_string()),
            ..Self::failure(error.to_string())
        }
    }

    fn unsupported(request: &Request) -> Self {
        Self::failure(format!("Unsupported action: {}", request.action()))
    }
}

/// Receiving end of the channel
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, request: Request) -> Response;
}

#[async_trait]
impl<D> MessageHandler for PageTranslator<D>
where
    D: DocumentTree + Send + 'static,
    D::NodeId: Send + Sync,
{
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::Translate => match self.translate().await {
                Ok(outcome) => Response {
                    translated: Some(outcome.translated),
                    message: outcome.message,
                    ..Response::ok()
                },
                Err(e) => Response::from_error(&e),
            },
            Request::Restore => match self.restore().await {
                Ok(_) => Response::ok(),
                Err(e) => Response::from_error(&e),
            },
            other => Response::unsupported(&other),
        }
    }
}

#[async_trait]
impl MessageHandler for BatchTranslator {
    async fn handle(&self, request: Request) -> Response {
        match request {
            Request::TranslateTexts { texts } => match self.translate_texts(&texts).await {
                Ok(translations) => Response {
                    translations: Some(translations),
                    ..Response::ok()
                },
                Err(e) => Response::from_error(&TranslateError::from(e)),
            },
            other => Response::unsupported(&other),
        }
    }
}

/// Decode a JSON request, run it and encode the response.
///
/// Never fails: undecodable input yields a failure response.
pub async fn dispatch_json(handler: &dyn MessageHandler, raw: &str) -> String {
    let response = match serde_json::from_str::<Request>(raw) {
        Ok(request) => {
            debug!("Dispatching '{}' request", request.action());
            handler.handle(request).await
        }
        Err(e) => {
            warn!("Rejected malformed message: {}", e);
            Response::failure(format!("Invalid message: {}", e))
        }
    };

    serde_json::to_string(&response).unwrap_or_else(|e| {
        warn!("Failed to encode response: {}", e);
        r#"{"success":false,"error":"Failed to encode response"}"#.to_string()
    })
}
