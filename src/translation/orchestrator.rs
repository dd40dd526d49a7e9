/*!
 * Page translation orchestrator.
 *
 * `PageTranslator` owns one document for one page session and drives the
 * translate and restore passes over it:
 *
 * `Idle → RateLimiting → CacheLoading → Extracting → Translating → Applying → Committing → Active`
 *
 * and `Active → Restoring → Idle`. A failed pass returns to `Active` when
 * earlier passes left translated text on the page and to `Idle` otherwise.
 * Only one translate or restore runs per document at a time; an overlapping
 * call fails with `TranslateError::Busy`.
 */

use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::app_config::TARGET_LANGUAGE;
use crate::clock::Clock;
use crate::database::KeyValueStore;
use crate::document::DocumentTree;
use crate::errors::{StoreError, TranslateError};
use crate::providers::TranslationProvider;
use crate::session::{ActivationFlags, SessionEvent};

use super::batch::BatchTranslator;
use super::cache::{CacheStats, TranslationCache};
use super::extractor::TextExtractor;
use super::rate_limit::{RateLimitPolicy, RateLimiter};
use super::registry::{OriginalTextRegistry, RestoreReport};

/// Where a page currently is in the translate/restore cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    Idle,
    RateLimiting,
    CacheLoading,
    Extracting,
    Translating,
    Applying,
    Committing,
    Active,
    Restoring,
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::RateLimiting => "rate-limiting",
            Self::CacheLoading => "cache-loading",
            Self::Extracting => "extracting",
            Self::Translating => "translating",
            Self::Applying => "applying",
            Self::Committing => "committing",
            Self::Active => "active",
            Self::Restoring => "restoring",
        };
        f.write_str(name)
    }
}

/// Tunable limits of a translation pass
#[derive(Debug, Clone, PartialEq)]
pub struct TranslatorSettings {
    /// Character budget per page (trimmed fragment text)
    pub max_chars: usize,
    /// Quota and cooldown
    pub rate_limit: RateLimitPolicy,
    /// Cache entry time-to-live
    pub cache_ttl: Duration,
    /// Texts per provider call
    pub batch_size: usize,
    /// Language every fragment is translated into
    pub target_language: String,
}

impl Default for TranslatorSettings {
    fn default() -> Self {
        Self {
            max_chars: 50_000,
            rate_limit: RateLimitPolicy::default(),
            cache_ttl: Duration::from_secs(24 * 60 * 60),
            batch_size: 100,
            target_language: TARGET_LANGUAGE.to_string(),
        }
    }
}

/// Components shared by every page: store, clock, provider and the global gates.
///
/// Cloning is cheap; all page translators of one process share the same
/// persisted cache and rate-limit state through the store.
#[derive(Debug, Clone)]
pub struct TranslationServices {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    settings: TranslatorSettings,
    extractor: TextExtractor,
    rate_limiter: RateLimiter,
    batch: BatchTranslator,
    flags: ActivationFlags,
}

impl TranslationServices {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        provider: Arc<dyn TranslationProvider>,
        settings: TranslatorSettings,
    ) -> Self {
        Self {
            extractor: TextExtractor::new(settings.max_chars),
            rate_limiter: RateLimiter::new(store.clone(), clock.clone(), settings.rate_limit),
            batch: BatchTranslator::new(
                provider,
                settings.batch_size,
                settings.target_language.clone(),
            ),
            flags: ActivationFlags::new(store.clone()),
            store,
            clock,
            settings,
        }
    }

    pub fn settings(&self) -> &TranslatorSettings {
        &self.settings
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }

    pub fn batch_translator(&self) -> &BatchTranslator {
        &self.batch
    }

    pub fn activation_flags(&self) -> &ActivationFlags {
        &self.flags
    }

    /// A fresh, unloaded cache over the shared store
    pub fn cache(&self) -> TranslationCache {
        TranslationCache::new(
            self.store.clone(),
            self.clock.clone(),
            self.settings.cache_ttl,
        )
    }
}

/// Result of a successful translate pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslateOutcome {
    /// Fragments whose text was replaced
    pub translated: usize,
    /// Informational note, e.g. when nothing was left to translate
    pub message: Option<String>,
    /// Whether the character budget cut the page short
    pub truncated: bool,
    /// Cache usage during the pass
    pub cache: CacheStats,
}

struct PageInner<D: DocumentTree> {
    document: D,
    registry: OriginalTextRegistry<D::NodeId>,
}

/// Translate/restore driver for one document session
pub struct PageTranslator<D: DocumentTree> {
    session_id: String,
    services: TranslationServices,
    state: Mutex<PageState>,
    inner: tokio::sync::Mutex<PageInner<D>>,
}

impl<D: DocumentTree> PageTranslator<D> {
    /// Start a session over `document`
    pub fn new(session_id: impl Into<String>, document: D, services: TranslationServices) -> Self {
        Self {
            session_id: session_id.into(),
            services,
            state: Mutex::new(PageState::Idle),
            inner: tokio::sync::Mutex::new(PageInner {
                document,
                registry: OriginalTextRegistry::new(),
            }),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn services(&self) -> &TranslationServices {
        &self.services
    }

    pub fn state(&self) -> PageState {
        *self.state.lock()
    }

    /// Whether translated text is currently shown
    pub fn is_active(&self) -> bool {
        self.state() == PageState::Active
    }

    /// Run `f` against the document once no pass is running
    pub async fn read_document<R>(&self, f: impl FnOnce(&D) -> R) -> R {
        let inner = self.inner.lock().await;
        f(&inner.document)
    }

    /// Mutate the document between passes, e.g. to model page scripts
    pub async fn modify_document<R>(&self, f: impl FnOnce(&mut D) -> R) -> R {
        let mut inner = self.inner.lock().await;
        f(&mut inner.document)
    }

    /// Give the document back, dropping the session
    pub fn into_document(self) -> D {
        self.inner.into_inner().document
    }

    fn set_state(&self, next: PageState) {
        let mut state = self.state.lock();
        if *state != next {
            debug!("Session {}: {} -> {}", self.session_id, *state, next);
            *state = next;
        }
    }

    fn resting_state(registry: &OriginalTextRegistry<D::NodeId>) -> PageState {
        if registry.is_active() {
            PageState::Active
        } else {
            PageState::Idle
        }
    }

    /// Translate every eligible fragment not yet translated in this session
    pub async fn translate(&self) -> Result<TranslateOutcome, TranslateError> {
        let mut guard = self.inner.try_lock().map_err(|_| TranslateError::Busy)?;
        let inner = &mut *guard;

        let result = self.run_translate(inner).await;
        self.set_state(Self::resting_state(&inner.registry));

        match &result {
            Ok(outcome) => info!(
                "Session {}: translated {} fragment(s) ({} cache hit(s), {} miss(es))",
                self.session_id, outcome.translated, outcome.cache.hits, outcome.cache.misses
            ),
            Err(e) => warn!("Session {}: translation failed: {}", self.session_id, e),
        }
        result
    }

    async fn run_translate(
        &self,
        inner: &mut PageInner<D>,
    ) -> Result<TranslateOutcome, TranslateError> {
        self.set_state(PageState::RateLimiting);
        let permit = self.services.rate_limiter.check().await?;

        self.set_state(PageState::CacheLoading);
        let mut cache = self.services.cache();
        cache.load().await?;

        self.set_state(PageState::Extracting);
        let extraction = self
            .services
            .extractor
            .extract(&inner.document, &inner.registry);
        if extraction.is_empty() {
            return Ok(TranslateOutcome {
                translated: 0,
                message: Some("No text to translate".to_string()),
                truncated: extraction.truncated,
                cache: cache.stats(),
            });
        }

        self.set_state(PageState::Translating);
        let unique = extraction.unique_texts();
        let mut translations = HashMap::with_capacity(unique.len());
        let mut uncached = Vec::new();
        for text in unique {
            match cache.get(&text) {
                Some(translation) => {
                    translations.insert(text, translation);
                }
                None => uncached.push(text),
            }
        }

        if !uncached.is_empty() {
            let fetched = self.services.batch.translate_texts(&uncached).await?;
            for (text, translation) in fetched {
                cache.set(text.clone(), translation.clone());
                translations.insert(text, translation);
            }
        }

        self.set_state(PageState::Applying);
        let mut translated = 0;
        for fragment in &extraction.fragments {
            let Some(translation) = translations
                .get(&fragment.text)
                .filter(|translation| !translation.trim().is_empty())
            else {
                continue;
            };
            let Some(original) = inner.document.text(fragment.node).map(str::to_string) else {
                continue;
            };

            let replacement = preserve_whitespace(&original, translation);
            match inner.document.set_text(fragment.node, &replacement) {
                Ok(()) => {
                    inner.registry.record(fragment.node, original);
                    translated += 1;
                }
                Err(e) => warn!("Could not apply translation to {:?}: {}", fragment.node, e),
            }
        }

        self.set_state(PageState::Committing);
        cache.flush().await?;
        self.services.rate_limiter.commit(permit).await?;
        if inner.registry.is_active() {
            self.services.flags.set_active(&self.session_id).await?;
        }

        Ok(TranslateOutcome {
            translated,
            message: None,
            truncated: extraction.truncated,
            cache: cache.stats(),
        })
    }

    /// Put every translated fragment back to its original text.
    ///
    /// Restoring a page with nothing translated is a no-op.
    pub async fn restore(&self) -> Result<RestoreReport, TranslateError> {
        let mut guard = self.inner.try_lock().map_err(|_| TranslateError::Busy)?;
        let inner = &mut *guard;

        if !inner.registry.is_active() {
            debug!("Session {}: nothing to restore", self.session_id);
            return Ok(RestoreReport::default());
        }

        self.set_state(PageState::Restoring);
        let report = inner.registry.restore(&mut inner.document);
        self.set_state(PageState::Idle);

        self.services.flags.clear(&self.session_id).await?;
        info!(
            "Session {}: restored {} fragment(s)",
            self.session_id, report.restored
        );
        Ok(report)
    }

    /// Forget this session's translated state after navigation or tab close.
    ///
    /// The document is left untouched; it belongs to a page that is going away.
    pub async fn end_session(&self, event: SessionEvent) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        inner.registry.clear();
        self.set_state(PageState::Idle);
        self.services
            .flags
            .handle_event(&self.session_id, event)
            .await
    }
}

/// Put `translation` between the leading and trailing whitespace of `original`
pub fn preserve_whitespace(original: &str, translation: &str) -> String {
    let start = original.len() - original.trim_start().len();
    let end = original.trim_end().len();
    if start >= end {
        return translation.to_string();
    }
    format!(
        "{}{}{}",
        &original[..start],
        translation.trim(),
        &original[end..]
    )
}
