/*!
 * Per-session activation flag.
 *
 * The flag is written after a successful translate pass and removed when the
 * page is restored, navigates away or is closed. The core never reads it to
 * make decisions; it exists for the toggle UI.
 */

use log::debug;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use crate::database::KeyValueStore;
use crate::errors::StoreError;

/// Store key of the activation flag for `session_id`
pub fn activation_key(session_id: &str) -> String {
    format!("tab_{}_active", session_id)
}

/// Fresh random session identifier
pub fn new_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lifecycle events that end a session's translated state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session's document started loading a new page
    Navigated,
    /// The session's tab was closed
    Closed,
}

/// Activation flags over the shared key-value store
#[derive(Debug, Clone)]
pub struct ActivationFlags {
    store: Arc<dyn KeyValueStore>,
}

impl ActivationFlags {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Mark `session_id` as showing a translated page
    pub async fn set_active(&self, session_id: &str) -> Result<(), StoreError> {
        debug!("Activation flag set for session {}", session_id);
        self.store
            .set(HashMap::from([(activation_key(session_id), Value::Bool(true))]))
            .await
    }

    /// Whether the flag is set for `session_id`
    pub async fn is_active(&self, session_id: &str) -> Result<bool, StoreError> {
        let key = activation_key(session_id);
        let values = self.store.get(&[key.as_str()]).await?;
        Ok(matches!(values.get(&key), Some(Value::Bool(true))))
    }

    /// Remove the flag for `session_id`
    pub async fn clear(&self, session_id: &str) -> Result<(), StoreError> {
        let key = activation_key(session_id);
        self.store.remove(&[key.as_str()]).await?;
        debug!("Activation flag cleared for session {}", session_id);
        Ok(())
    }

    /// React to a lifecycle event of `session_id`
    pub async fn handle_event(&self, session_id: &str, event: SessionEvent) -> Result<(), StoreError> {
        debug!("Session {} event: {:?}", session_id, event);
        match event {
            SessionEvent::Navigated | SessionEvent::Closed => self.clear(session_id).await,
        }
    }
}
