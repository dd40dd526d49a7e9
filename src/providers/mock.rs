/*!
 * Mock provider implementation for testing.
 *
 * This module provides a mock provider that simulates different behaviors:
 * - `MockProvider::working()` - Always succeeds with a tagged translation
 * - `MockProvider::failing(status)` - Always fails with the given HTTP status
 * - `MockProvider::fail_on_batch(n, status)` - Fails only on the n-th call (0-based)
 * - `MockProvider::short_response()` - Drops the last translation of every batch
 *
 * Every submitted batch is recorded so tests can count provider calls.
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockBehavior {
    /// Always succeeds
    Working,
    /// Always fails with the status
    Failing { status: u16 },
    /// Fails on one call, succeeds on all others
    FailOnBatch { batch: usize, status: u16 },
    /// Returns one translation fewer than requested
    ShortResponse,
    /// Answers every text with an empty string
    Blank,
}

/// Mock provider for testing translation behavior
#[derive(Debug, Clone)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Raw message attached to simulated failures
    error_message: String,
    /// Every batch received, in call order
    calls: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            error_message: "Simulated provider failure".to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors with `status`
    pub fn failing(status: u16) -> Self {
        Self::new(MockBehavior::Failing { status })
    }

    /// Create a mock that fails only on call number `batch`
    pub fn fail_on_batch(batch: usize, status: u16) -> Self {
        Self::new(MockBehavior::FailOnBatch { batch, status })
    }

    /// Create a mock whose responses are one translation short
    pub fn short_response() -> Self {
        Self::new(MockBehavior::ShortResponse)
    }

    /// Create a mock provider that answers with empty translations
    pub fn blank() -> Self {
        Self::new(MockBehavior::Blank)
    }

    /// Set the raw provider message returned with failures
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// The translation this mock produces for `text`
    pub fn translation_of(text: &str, target_language: &str) -> String {
        format!("[{}] {}", target_language, text)
    }

    /// Number of provider calls so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Batches received so far
    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.lock().clone()
    }

    /// Total number of texts submitted across all calls
    pub fn submitted_texts(&self) -> usize {
        self.calls.lock().iter().map(Vec::len).sum()
    }
}

#[async_trait]
impl TranslationProvider for MockProvider {
    async fn translate(
        &self,
        batch: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let call_index = {
            let mut calls = self.calls.lock();
            calls.push(batch.to_vec());
            calls.len() - 1
        };

        // Suspend once, as a network call would
        tokio::task::yield_now().await;

        let translate_all = || {
            batch
                .iter()
                .map(|text| Self::translation_of(text, target_language))
                .collect::<Vec<_>>()
        };

        match self.behavior {
            MockBehavior::Working => Ok(translate_all()),
            MockBehavior::Failing { status } => {
                Err(ProviderError::from_status(status, self.error_message.clone()))
            }
            MockBehavior::FailOnBatch { batch: fail_at, status } => {
                if call_index == fail_at {
                    Err(ProviderError::from_status(status, self.error_message.clone()))
                } else {
                    Ok(translate_all())
                }
            }
            MockBehavior::ShortResponse => {
                let mut translations = translate_all();
                translations.pop();
                Ok(translations)
            }
            MockBehavior::Blank => Ok(vec![String::new(); batch.len()]),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}
