/*!
 * Page translation core.
 *
 * This module contains everything a translate or restore pass touches.
 * It is split into several submodules:
 *
 * - `extractor`: Discovery of translatable text fragments
 * - `cache`: Persistent TTL-bounded translation cache
 * - `rate_limit`: Hourly quota and cooldown gate
 * - `batch`: Deduplicated, sequential batch translation
 * - `registry`: Original text registry for exact restoration
 * - `orchestrator`: The per-page translate/restore state machine
 */

// Re-export main types for easier usage
pub use self::batch::BatchTranslator;
pub use self::cache::{CacheEntry, CacheStats, TranslationCache};
pub use self::extractor::{Extraction, TextExtractor, TextFragment, text_fragments};
pub use self::orchestrator::{
    PageState, PageTranslator, TranslateOutcome, TranslationServices, TranslatorSettings,
};
pub use self::rate_limit::{
    RateLimitPermit, RateLimitPolicy, RateLimitState, RateLimitStatus, RateLimiter,
};
pub use self::registry::{OriginalTextRegistry, RestoreReport};

// Submodules
pub mod batch;
pub mod cache;
pub mod extractor;
pub mod orchestrator;
pub mod rate_limit;
pub mod registry;
