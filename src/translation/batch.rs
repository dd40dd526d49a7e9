/*!
 * Batch translation client.
 *
 * Deduplicates source texts, splits them into bounded batches and submits the
 * batches to the provider one after another. Batches never run concurrently,
 * so a failure always leaves a well-defined prefix of completed batches and
 * names exactly one failing batch.
 */

use log::{debug, error, info};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use crate::errors::ProviderError;
use crate::providers::TranslationProvider;

/// Distinct texts in first-encounter order
pub fn unique_texts<'a>(texts: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    texts
        .into_iter()
        .filter(|text| seen.insert(*text))
        .map(str::to_string)
        .collect()
}

/// Split `texts` into consecutive batches of at most `batch_size` items
pub fn plan_batches(texts: &[String], batch_size: usize) -> Vec<&[String]> {
    texts.chunks(batch_size.max(1)).collect()
}

/// Sequential batch driver over a translation provider
#[derive(Debug, Clone)]
pub struct BatchTranslator {
    /// The provider every batch goes to
    provider: Arc<dyn TranslationProvider>,

    /// Maximum texts per provider call
    batch_size: usize,

    /// Language every batch is translated into
    target_language: String,
}

impl BatchTranslator {
    /// Create a new batch translator; a zero batch size is treated as one
    pub fn new(
        provider: Arc<dyn TranslationProvider>,
        batch_size: usize,
        target_language: impl Into<String>,
    ) -> Self {
        Self {
            provider,
            batch_size: batch_size.max(1),
            target_language: target_language.into(),
        }
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn target_language(&self) -> &str {
        &self.target_language
    }

    /// Translate `texts`, returning one entry per distinct text.
    ///
    /// Fails on the first batch the provider rejects; whatever earlier batches
    /// produced is dropped with the error.
    pub async fn translate_texts(
        &self,
        texts: &[String],
    ) -> Result<HashMap<String, String>, ProviderError> {
        let unique = unique_texts(texts.iter().map(String::as_str));
        let mut results = HashMap::with_capacity(unique.len());
        if unique.is_empty() {
            return Ok(results);
        }

        let batches = plan_batches(&unique, self.batch_size);
        let total_batches = batches.len();

        for (batch_index, batch) in batches.into_iter().enumerate() {
            info!(
                "Processing batch {} of {} ({} texts) with {}",
                batch_index + 1,
                total_batches,
                batch.len(),
                self.provider.name()
            );

            let start_time = Instant::now();
            let translations = self
                .provider
                .translate(batch, &self.target_language)
                .await
                .inspect_err(|e| {
                    error!(
                        "Batch {} failed: {} ({})",
                        batch_index + 1,
                        e,
                        e.raw_message()
                    );
                })?;

            if translations.len() != batch.len() {
                let message = format!(
                    "Batch {} returned {} translations for {} texts",
                    batch_index + 1,
                    translations.len(),
                    batch.len()
                );
                error!("{}", message);
                return Err(ProviderError::MalformedResponse { message });
            }

            results.extend(batch.iter().cloned().zip(translations));

            debug!(
                "Batch {} completed in {:?}",
                batch_index + 1,
                start_time.elapsed()
            );
        }

        Ok(results)
    }
}
