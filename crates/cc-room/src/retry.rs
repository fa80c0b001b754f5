use std::future::Future;

use cc_core::BackoffConfig;
use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::error::RoomError;

/// Sleeps `BackoffConfig::delay_for(attempt)` scaled by a random factor in
/// `[1.0, jitter]` (spec.md §4.4: "grow 2x, jitter up to 1.5x").
pub async fn sleep_with_jitter(cfg: &BackoffConfig, attempt: u32) {
    let base = cfg.delay_for(attempt);
    let factor = rand::rng().random_range(1.0..=cfg.jitter.max(1.0));
    tokio::time::sleep(base.mul_f64(factor)).await;
}

pub enum RetryOutcome<T> {
    Ready(T),
    Cancelled,
    GaveUp(RoomError),
}

/// Calls `f` until it succeeds, a non-retriable error is returned, the
/// attempt budget is spent, or `cancel` fires.
pub async fn retry_with_backoff<T, F, Fut>(cfg: &BackoffConfig, cancel: &CancellationToken, mut f: F) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, RoomError>>,
{
    for attempt in 0..cfg.max_attempts {
        if cancel.is_cancelled() {
            return RetryOutcome::Cancelled;
        }
        match f().await {
            Ok(value) => return RetryOutcome::Ready(value),
            Err(err) if err.is_retriable() => {
                tokio::select! {
                    _ = sleep_with_jitter(cfg, attempt) => {}
                    _ = cancel.cancelled() => return RetryOutcome::Cancelled,
                }
            }
            Err(err) => return RetryOutcome::GaveUp(err),
        }
    }
    RetryOutcome::GaveUp(RoomError::Transport("exhausted retry attempts".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cc_dto::ApiError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_immediately_without_sleeping() {
        let cfg = BackoffConfig::default();
        let cancel = CancellationToken::new();
        let outcome = retry_with_backoff(&cfg, &cancel, || async { Ok::<_, RoomError>(42) }).await;
        assert!(matches!(outcome, RetryOutcome::Ready(42)));
    }

    #[tokio::test]
    async fn non_retriable_error_bails_without_retrying() {
        let cfg = BackoffConfig::default();
        let cancel = CancellationToken::new();
        let calls = AtomicU32::new(0);
        let outcome = retry_with_backoff(&cfg, &cancel, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(RoomError::Api(ApiError::BadRequest)) }
        })
        .await;
        assert!(matches!(outcome, RetryOutcome::GaveUp(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn cancellation_stops_the_retry_loop() {
        let cfg = BackoffConfig::default();
        let cancel = CancellationToken::new();
        cancel.cancel();
        let outcome = retry_with_backoff(&cfg, &cancel, || async { Err::<(), _>(RoomError::Api(ApiError::Locked)) }).await;
        assert!(matches!(outcome, RetryOutcome::Cancelled));
    }
}
