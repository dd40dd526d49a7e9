/*!
 * Tests for the quota and cooldown gate
 */

use std::sync::Arc;
use std::time::Duration;

use latinify::clock::{Clock, ManualClock};
use latinify::database::{MemoryStore, load_value};
use latinify::errors::{RateLimitError, TranslateError};
use latinify::translation::rate_limit::{
    RATE_LIMIT_STORAGE_KEY, RateLimitPolicy, RateLimitState, RateLimiter,
};

fn limiter(policy: RateLimitPolicy) -> (RateLimiter, Arc<ManualClock>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let clock = Arc::new(ManualClock::new(10_000_000));
    (RateLimiter::new(store.clone(), clock.clone(), policy), clock, store)
}

#[tokio::test]
async fn test_check_withinCooldown_shouldReject() {
    let (limiter, clock, _) = limiter(RateLimitPolicy::default());
    let permit = limiter.check().await.unwrap();
    limiter.commit(permit).await.unwrap();

    clock.advance(Duration::from_millis(4_999));
    match limiter.check().await {
        Err(TranslateError::RateLimit(RateLimitError::CooldownActive { wait_seconds })) => {
            assert_eq!(wait_seconds, 1)
        }
        other => panic!("expected cooldown, got {:?}", other),
    }

    clock.advance(Duration::from_millis(1));
    assert!(limiter.check().await.is_ok());
}

#[tokio::test]
async fn test_check_afterHourlyLimit_shouldRejectUntilWindowReset() {
    let policy = RateLimitPolicy {
        hourly_limit: 3,
        cooldown: Duration::from_millis(10),
        ..RateLimitPolicy::default()
    };
    let (limiter, clock, _) = limiter(policy);

    for _ in 0..3 {
        let permit = limiter.check().await.unwrap();
        limiter.commit(permit).await.unwrap();
        clock.advance(Duration::from_secs(1));
    }

    assert!(matches!(
        limiter.check().await,
        Err(TranslateError::RateLimit(RateLimitError::HourlyQuotaExceeded))
    ));

    clock.advance(Duration::from_secs(60 * 60));
    assert!(limiter.check().await.is_ok());
}

#[tokio::test]
async fn test_check_shouldNotPersistAnything() {
    let (limiter, _, store) = limiter(RateLimitPolicy::default());

    let _permit = limiter.check().await.unwrap();

    assert!(store.is_empty());
    assert_eq!(limiter.snapshot().await.unwrap(), RateLimitState::default());
}

#[tokio::test]
async fn test_commit_shouldIncrementAndStamp() {
    let (limiter, clock, store) = limiter(RateLimitPolicy::default());

    let permit = limiter.check().await.unwrap();
    let window_end = permit.state().window_reset_at;
    clock.advance(Duration::from_millis(250));
    limiter.commit(permit).await.unwrap();

    let state: RateLimitState = load_value(store.as_ref(), RATE_LIMIT_STORAGE_KEY)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(state.count, 1);
    assert_eq!(state.last_attempt_at, clock.now_millis());
    assert_eq!(state.window_reset_at, window_end);
}

#[tokio::test]
async fn test_rejectedAttempt_shouldLeaveStateUnchanged() {
    let (limiter, _, _) = limiter(RateLimitPolicy::default());
    let permit = limiter.check().await.unwrap();
    let committed = limiter.commit(permit).await.unwrap();

    assert!(limiter.check().await.is_err());
    assert_eq!(limiter.snapshot().await.unwrap(), committed);
}

#[tokio::test]
async fn test_status_afterWindowEnds_shouldShowFreshWindow() {
    let policy = RateLimitPolicy {
        hourly_limit: 2,
        ..RateLimitPolicy::default()
    };
    let (limiter, clock, _) = limiter(policy);
    for _ in 0..2 {
        let permit = limiter.check().await.unwrap();
        limiter.commit(permit).await.unwrap();
        clock.advance(policy.cooldown);
    }

    let exhausted = limiter.status().await.unwrap();
    assert_eq!(exhausted.state.count, 2);
    assert_eq!(exhausted.remaining(), 0);
    assert_eq!(exhausted.cooldown_wait_seconds, None);

    clock.advance(Duration::from_secs(60 * 60));
    let status = limiter.status().await.unwrap();
    assert_eq!(status.state.count, 0);
    assert_eq!(status.remaining(), 2);
    assert!(status.state.window_reset_at > clock.now_millis());
    assert_eq!(limiter.snapshot().await.unwrap().count, 2);
}

#[tokio::test]
async fn test_status_insideCooldown_shouldReportWait() {
    let (limiter, clock, _) = limiter(RateLimitPolicy::default());
    let permit = limiter.check().await.unwrap();
    limiter.commit(permit).await.unwrap();

    clock.advance(Duration::from_millis(2_500));
    let status = limiter.status().await.unwrap();

    assert_eq!(status.cooldown_wait_seconds, Some(3));
    assert_eq!(status.state.count, 1);
}
