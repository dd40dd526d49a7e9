/*!
 * Provider implementations for remote translation services.
 *
 * This module contains the provider seam and its implementations:
 * - Google: Google Cloud Translation v2
 * - Mock: scripted provider recording every submitted batch
 */

use async_trait::async_trait;
use std::fmt::Debug;

use crate::errors::ProviderError;

/// Common trait for all translation providers
///
/// A provider translates one batch per call and answers positionally: the
/// n-th returned string is the translation of the n-th submitted text.
#[async_trait]
pub trait TranslationProvider: Send + Sync + Debug {
    /// Translate a batch of texts into `target_language`
    ///
    /// # Arguments
    /// * `batch` - Texts to translate, in submission order
    /// * `target_language` - Language code of the output
    ///
    /// # Returns
    /// * `Result<Vec<String>, ProviderError>` - One translation per input, or a classified error
    async fn translate(
        &self,
        batch: &[String],
        target_language: &str,
    ) -> Result<Vec<String>, ProviderError>;

    /// Short provider name for logs
    fn name(&self) -> &str;
}

pub mod google;
pub mod mock;
