use anyhow::{Context, Result};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::Config;
use crate::clock::{Clock, SystemClock};
use crate::database::{KeyValueStore, SqliteStore};
use crate::document::Page;
use crate::errors::AppError;
use crate::providers::TranslationProvider;
use crate::providers::google::GoogleTranslate;
use crate::session::{SessionEvent, new_session_id};
use crate::translation::{
    CacheStats, PageTranslator, RateLimitStatus, TranslateOutcome, TranslationServices,
};

// @module: Application controller for page translation

/// Result of translating one page file
#[derive(Debug, Clone)]
pub struct FileTranslation {
    /// Where the translated page was written
    pub output_path: PathBuf,
    /// The pass outcome
    pub outcome: TranslateOutcome,
}

/// Cache state after a load
#[derive(Debug, Clone, Copy)]
pub struct CacheReport {
    /// Entries removed because they outlived the TTL
    pub purged: usize,
    /// Entries still cached
    pub stats: CacheStats,
}

/// Main application controller for page translation
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Shared translation components
    services: TranslationServices,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let store = match &config.storage.database_path {
            Some(path) => SqliteStore::open(path),
            None => SqliteStore::open_default(),
        }
        .context("Failed to open the translation store")?;

        let provider = GoogleTranslate::new(
            config.provider.api_key.clone(),
            &config.provider.endpoint,
            config.provider_timeout(),
        )
        .context("Failed to create the translation provider")?;

        Ok(Self::with_components(
            config,
            Arc::new(store),
            Arc::new(SystemClock),
            Arc::new(provider),
        ))
    }

    /// Create a controller over explicit components
    pub fn with_components(
        config: Config,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        provider: Arc<dyn TranslationProvider>,
    ) -> Self {
        let services = TranslationServices::new(store, clock, provider, config.translator_settings());
        Self { config, services }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn services(&self) -> &TranslationServices {
        &self.services
    }

    /// Translate the page stored at `input_file` and write the result.
    ///
    /// Without `output_file` the page is written next to the input as `<name>.la.json`.
    pub async fn translate_file(
        &self,
        input_file: &Path,
        output_file: Option<&Path>,
    ) -> Result<FileTranslation, AppError> {
        let raw = std::fs::read_to_string(input_file).map_err(|e| {
            AppError::File(format!("Failed to read {}: {}", input_file.display(), e))
        })?;
        let page = Page::from_json(&raw).map_err(|e| {
            AppError::File(format!("Invalid page file {}: {}", input_file.display(), e))
        })?;

        let translator = PageTranslator::new(new_session_id(), page, self.services.clone());
        debug!("Started session {} for {}", translator.session_id(), input_file.display());

        let outcome = translator.translate().await?;
        translator.end_session(SessionEvent::Closed).await?;
        let page = translator.into_document();

        let output_path = match output_file {
            Some(path) => path.to_path_buf(),
            None => Self::default_output_path(input_file, &self.services.settings().target_language),
        };
        let json = page
            .to_json_pretty()
            .map_err(|e| AppError::File(format!("Failed to encode page: {}", e)))?;
        std::fs::write(&output_path, json)?;

        info!(
            "Translated {} fragment(s) from {} into {}",
            outcome.translated,
            input_file.display(),
            output_path.display()
        );

        Ok(FileTranslation {
            output_path,
            outcome,
        })
    }

    /// Current rate-limit state
    pub async fn rate_limit_status(&self) -> Result<RateLimitStatus, AppError> {
        Ok(self.services.rate_limiter().status().await?)
    }

    /// Load the cache (purging expired entries) and report its size
    pub async fn cache_report(&self) -> Result<CacheReport, AppError> {
        let mut cache = self.services.cache();
        let purged = cache.load().await?;
        Ok(CacheReport {
            purged,
            stats: cache.stats(),
        })
    }

    fn default_output_path(input_file: &Path, target_language: &str) -> PathBuf {
        let stem = input_file
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "page".to_string());
        input_file.with_file_name(format!("{}.{}.json", stem, target_language))
    }
}
