/*!
 * Document session tracking.
 *
 * A document session is one page load in one tab. This module provides:
 * - Session identifiers
 * - The persisted per-session activation flag
 * - Flag cleanup on navigation and session end
 */

pub mod activation;

// Re-export main types
pub use activation::{ActivationFlags, SessionEvent, activation_key, new_session_id};
