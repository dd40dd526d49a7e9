/*!
 * Windowed quota and cooldown gate on translation passes.
 *
 * The state is global and persisted. Only a successful pass mutates the
 * counters: `check` hands out a permit, and the pass consumes it with
 * `commit` once every translation has been applied.
 */

use log::debug;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, duration_millis};
use crate::database::{KeyValueStore, load_value, save_value};
use crate::errors::{RateLimitError, StoreError, TranslateError};

/// Store key holding the rate-limit state
pub const RATE_LIMIT_STORAGE_KEY: &str = "latinify_rate_limit";

/// Persisted rate-limit state, timestamps in epoch milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitState {
    /// Successful passes in the current window
    pub count: u32,

    /// When the current window ends
    #[serde(rename = "resetTime")]
    pub window_reset_at: i64,

    /// When the last successful pass committed
    #[serde(rename = "lastTranslation")]
    pub last_attempt_at: i64,
}

/// Limits enforced by the rate limiter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    /// Successful passes allowed per window
    pub hourly_limit: u32,
    /// Minimum gap between two successful passes
    pub cooldown: Duration,
    /// Window length
    pub window: Duration,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            hourly_limit: 30,
            cooldown: Duration::from_millis(5_000),
            window: Duration::from_secs(60 * 60),
        }
    }
}

/// Admission to one translation pass.
///
/// Holds the state evaluated by `check`, window reset included. It is
/// consumed by `RateLimiter::commit`, so a pass cannot commit twice.
#[derive(Debug)]
#[must_use = "a permit must be committed after a successful pass"]
pub struct RateLimitPermit {
    state: RateLimitState,
}

impl RateLimitPermit {
    /// The evaluated state this permit was granted on
    pub fn state(&self) -> RateLimitState {
        self.state
    }
}

/// Read-only view of the limiter as the next pass would see it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Stored state with an ended window already rolled over
    pub state: RateLimitState,
    pub hourly_limit: u32,
    /// Seconds left in the cooldown, if one is running
    pub cooldown_wait_seconds: Option<u64>,
}

impl RateLimitStatus {
    /// Passes left in the current window
    pub fn remaining(&self) -> u32 {
        self.hourly_limit.saturating_sub(self.state.count)
    }
}

/// Rate limiter over the shared key-value store
#[derive(Debug, Clone)]
pub struct RateLimiter {
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(store: Arc<dyn KeyValueStore>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self {
            store,
            clock,
            policy,
        }
    }

    pub fn policy(&self) -> RateLimitPolicy {
        self.policy
    }

    /// Current persisted state; a missing record reads as the default state
    pub async fn snapshot(&self) -> Result<RateLimitState, StoreError> {
        Ok(load_value(self.store.as_ref(), RATE_LIMIT_STORAGE_KEY)
            .await?
            .unwrap_or_default())
    }

    /// The state a check at the current time would start from, without persisting it
    pub async fn status(&self) -> Result<RateLimitStatus, StoreError> {
        let now = self.clock.now_millis();
        let state = roll_window(self.snapshot().await?, &self.policy, now);
        let cooldown_wait_seconds = match evaluate(state, &self.policy, now) {
            Err(RateLimitError::CooldownActive { wait_seconds }) => Some(wait_seconds),
            _ => None,
        };
        Ok(RateLimitStatus {
            state,
            hourly_limit: self.policy.hourly_limit,
            cooldown_wait_seconds,
        })
    }

    /// Evaluate window reset, cooldown and quota at the current time.
    ///
    /// Nothing is persisted here; a rejected attempt leaves the stored state untouched.
    pub async fn check(&self) -> Result<RateLimitPermit, TranslateError> {
        let state = self.snapshot().await?;
        let state = evaluate(state, &self.policy, self.clock.now_millis())?;
        debug!(
            "Rate limit check passed ({}/{} this window)",
            state.count, self.policy.hourly_limit
        );
        Ok(RateLimitPermit { state })
    }

    /// Record a successful pass: bump the count, stamp the time, persist
    pub async fn commit(&self, permit: RateLimitPermit) -> Result<RateLimitState, StoreError> {
        let mut state = permit.state;
        state.count = state.count.saturating_add(1);
        state.last_attempt_at = self.clock.now_millis();
        save_value(self.store.as_ref(), RATE_LIMIT_STORAGE_KEY, &state).await?;
        debug!(
            "Rate limit committed ({}/{} this window)",
            state.count, self.policy.hourly_limit
        );
        Ok(state)
    }
}

/// Start a new window when the stored one ended before `now`
pub fn roll_window(mut state: RateLimitState, policy: &RateLimitPolicy, now: i64) -> RateLimitState {
    if now > state.window_reset_at {
        state.count = 0;
        state.window_reset_at = now.saturating_add(duration_millis(policy.window));
    }
    state
}

/// Apply the window reset, then the cooldown and quota checks, to `state` at `now`
pub fn evaluate(
    mut state: RateLimitState,
    policy: &RateLimitPolicy,
    now: i64,
) -> Result<RateLimitState, RateLimitError> {
    state = roll_window(state, policy, now);

    let cooldown = duration_millis(policy.cooldown);
    let elapsed = now.saturating_sub(state.last_attempt_at);
    if elapsed < cooldown {
        let remaining = u64::try_from(cooldown - elapsed).unwrap_or(0);
        return Err(RateLimitError::CooldownActive {
            wait_seconds: remaining.div_ceil(1_000),
        });
    }

    if state.count >= policy.hourly_limit {
        return Err(RateLimitError::HourlyQuotaExceeded);
    }

    Ok(state)
}
