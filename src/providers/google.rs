use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

use super::TranslationProvider;
use crate::errors::ProviderError;

/// Public endpoint of the Cloud Translation v2 API
pub const DEFAULT_ENDPOINT: &str = "https://translation.googleapis.com/language/translate/v2";

/// Google Cloud Translation client
#[derive(Debug)]
pub struct GoogleTranslate {
    /// HTTP client for API requests
    client: Client,
    /// API key passed as the `key` query parameter
    api_key: String,
    /// API endpoint URL
    endpoint: Url,
}

/// Translation request body
#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    /// Texts to translate
    q: &'a [String],
    /// Target language code
    target: &'a str,
    /// Treat input as plain text rather than HTML
    format: &'static str,
}

/// Successful response envelope
#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: TranslateData,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
struct Translation {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

/// Error response envelope
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl GoogleTranslate {
    /// Create a new client
    pub fn new(
        api_key: impl Into<String>,
        endpoint: &str,
        timeout: Duration,
    ) -> Result<Self, url::ParseError> {
        let endpoint = if endpoint.is_empty() {
            DEFAULT_ENDPOINT
        } else {
            endpoint
        };

        Ok(Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            api_key: api_key.into(),
            endpoint: Url::parse(endpoint)?,
        })
    }

    fn request_url(&self) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut().append_pair("key", &self.api_key);
        url
    }

    /// Pull the provider's message out of an error body, falling back to the raw text
    fn error_message(body: &str) -> String {
        serde_json::from_str::<ErrorResponse>(body)
            .ok()
            .and_then(|r| r.error)
            .and_then(|e| e.message)
            .unwrap_or_else(|| body.trim().to_string())
    }
}

#[async_trait]
impl TranslationProvider for GoogleTranslate {
    async fn translate(
        &self,
        batch: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let request = TranslateRequest {
            q: batch,
            target: target_language,
            format: "text",
        };

        debug!("Sending {} text(s) to Google Translate", batch.len());

        let response = self
            .client
            .post(self.request_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::Network {
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            let message = Self::error_message(&body);
            error!("Google Translate API error ({}): {}", status, message);
            return Err(ProviderError::from_status(status.as_u16(), message));
        }

        let parsed = response
            .json::<TranslateResponse>()
            .await
            .map_err(|e| ProviderError::MalformedResponse {
                message: format!("Failed to parse Google Translate response: {}", e),
            })?;

        Ok(parsed
            .data
            .translations
            .into_iter()
            .map(|t| t.translated_text)
            .collect())
    }

    fn name(&self) -> &str {
        "google"
    }
}
