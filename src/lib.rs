/*!
 * # Latinify - page text into Latin and back
 *
 * A Rust library for translating the visible text of a document into Latin
 * and restoring it exactly.
 *
 * ## Features
 *
 * - Lazy discovery of translatable text fragments with a per-page character budget
 * - Persistent translation cache with a 24 hour time-to-live
 * - Hourly quota and cooldown between translation passes
 * - Deduplicated, strictly sequential batch calls to the Google Cloud Translation API
 * - Exact restoration of the original text
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `app_controller`: Main application controller
 * - `document`: Document tree accessor and the JSON page model
 * - `translation`: The translate/restore core:
 *   - `translation::extractor`: Text fragment discovery
 *   - `translation::cache`: Translation cache
 *   - `translation::rate_limit`: Quota and cooldown gate
 *   - `translation::batch`: Batch translation client
 *   - `translation::registry`: Original text registry
 *   - `translation::orchestrator`: Per-page state machine
 * - `providers`: Translation provider clients:
 *   - `providers::google`: Google Cloud Translation v2 client
 *   - `providers::mock`: Scriptable provider for tests
 * - `database`: Persistent key-value store (SQLite and in-memory)
 * - `session`: Document sessions and activation flags
 * - `messaging`: Request/response channel
 * - `clock`: Injectable time source
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod clock;
pub mod database;
pub mod document;
pub mod errors;
pub mod messaging;
pub mod providers;
pub mod session;
pub mod translation;

// Re-export main types for easier usage
pub use app_config::Config;
pub use document::{DocumentTree, Page, PageNode};
pub use errors::{AppError, ProviderError, RateLimitError, StoreError, TranslateError};
pub use messaging::{MessageHandler, Request, Response, dispatch_json};
pub use translation::{PageState, PageTranslator, TranslationServices, TranslatorSettings};
