// =============================================================================
// Retry loop — per-attempt timeout, doubling backoff, cancellation
// =============================================================================
//
// attempt 0 ── fail ── sleep(base) ── attempt 1 ── fail ── sleep(2*base) ── ...
//
// Cancellation is checked before every attempt and raced against both the
// attempt and the backoff sleep, so a cancelled call returns promptly.
// =============================================================================

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use super::cancel::{cancelled_or_pending, CancelToken};
use super::error::FetchError;
use crate::config::FetcherConfig;

/// Attempt budget for one logical request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `0` means a single attempt.
    pub max_retries: u32,
    /// Sleep before the first retry, doubled for each further one.
    pub base_delay: Duration,
    /// Wall-clock budget of one attempt.
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetcherConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            base_delay: Duration::from_millis(config.base_delay_ms),
            timeout: Duration::from_millis(config.timeout_ms),
        }
    }

    /// Same timeout, no retries.
    pub fn single_attempt(&self) -> Self {
        Self {
            max_retries: 0,
            ..*self
        }
    }

    /// Upper bound on the wall-clock time of a call that never succeeds.
    pub fn worst_case(&self) -> Duration {
        let attempts = self.max_retries + 1;
        let sleeps: Duration = (0..self.max_retries)
            .map(|i| self.base_delay.saturating_mul(1u32 << i.min(31)))
            .sum();
        self.timeout.saturating_mul(attempts) + sleeps
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&FetcherConfig::default())
    }
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent. Returns the last error in the latter two cases and
/// [`FetchError::Cancelled`] as soon as `cancel` fires.
pub async fn with_retry<T, F, Fut>(
    policy: &RetryPolicy,
    cancel: Option<&CancelToken>,
    endpoint: &'static str,
    mut attempt: F,
) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut retry = 0u32;
    let mut delay = policy.base_delay;

    loop {
        if cancel.is_some_and(CancelToken::is_cancelled) {
            return Err(FetchError::Cancelled);
        }

        let outcome = tokio::select! {
            biased;
            _ = cancelled_or_pending(cancel) => return Err(FetchError::Cancelled),
            res = tokio::time::timeout(policy.timeout, attempt()) => {
                res.unwrap_or(Err(FetchError::Timeout))
            }
        };

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_retryable() || retry >= policy.max_retries {
            return Err(err);
        }

        retry += 1;
        debug!(
            endpoint,
            retry,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "attempt failed, backing off"
        );

        tokio::select! {
            biased;
            _ = cancelled_or_pending(cancel) => return Err(FetchError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        delay = delay.saturating_mul(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 2,
            base_delay: Duration::from_secs(1),
            timeout: Duration::from_secs(8),
        }
    }

    #[test]
    fn worst_case_adds_timeouts_and_sleeps() {
        assert_eq!(policy().worst_case(), Duration::from_secs(8 * 3 + 1 + 2));
        assert_eq!(policy().single_attempt().worst_case(), Duration::from_secs(8));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_with_doubling_delay() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();
        let res: Result<(), _> = with_retry(&policy(), None, "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Status(503))
        })
        .await;

        assert!(matches!(res, Err(FetchError::Status(503))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(3) && elapsed < Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failure() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res = with_retry(&policy(), None, "test", move || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(FetchError::Timeout)
            } else {
                Ok(7)
            }
        })
        .await;
        assert_eq!(res.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let started = Instant::now();
        let res: Result<(), _> = with_retry(&policy(), None, "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(FetchError::Status(404))
        })
        .await;
        assert!(matches!(res, Err(FetchError::Status(404))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_attempt_times_out() {
        let started = Instant::now();
        let res: Result<(), _> = with_retry(&policy().single_attempt(), None, "test", || {
            std::future::pending::<Result<(), FetchError>>()
        })
        .await;
        assert!(matches!(res, Err(FetchError::Timeout)));
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_secs(8) && elapsed < Duration::from_secs(9));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_interrupts_backoff_sleep() {
        let token = CancelToken::new();
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let policy = policy();
        let started = Instant::now();

        let (res, ()) = tokio::join!(
            with_retry(&policy, Some(&token), "test", move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<(), _>(FetchError::Status(500))
            }),
            async {
                tokio::time::sleep(Duration::from_millis(500)).await;
                token.cancel();
            }
        );

        assert!(matches!(res, Err(FetchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn pre_cancelled_token_skips_attempt() {
        let token = CancelToken::new();
        token.cancel();
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let res: Result<(), _> = with_retry(&policy(), Some(&token), "test", move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        })
        .await;
        assert!(matches!(res, Err(FetchError::Cancelled)));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
