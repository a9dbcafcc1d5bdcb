//! Exponential backoff for rate-limited service calls.

use lorebook_error::{
    ExtractionError, ExtractionErrorKind, LorebookError, LorebookResult, RetryableError,
};
use rand::Rng;
use std::future::Future;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, instrument, warn};

/// Attempt ceiling, base delay and jitter applied to every service call.
///
/// The delay before retry `k` (counting from zero) is
/// `base_delay * 2^k + uniform(0..=max_jitter)`, clamped so that delays never
/// decrease. Only failures classified as rate-limited are retried; any other
/// failure is returned after the first attempt.
///
/// # Examples
///
/// ```
/// use lorebook_rate_limit::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(*policy.max_attempts(), 5);
///
/// let delays = policy.delays();
/// assert_eq!(delays.len(), 4);
/// assert!(delays[0] >= Duration::from_millis(5000));
/// assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_getters::Getters)]
pub struct RetryPolicy {
    /// Total calls allowed, including the first
    max_attempts: u32,
    /// Delay before the first retry, before jitter
    base_delay: Duration,
    /// Upper bound of the uniform jitter added to each delay
    max_jitter: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(5000),
            max_jitter: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` below 1 is raised to 1.
    pub fn new(max_attempts: u32, base_delay: Duration, max_jitter: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_jitter,
        }
    }

    /// Backoff schedule for one call: one delay per possible retry.
    pub fn delays(&self) -> Vec<Duration> {
        self.delays_with(&mut rand::thread_rng())
    }

    /// Backoff schedule drawing jitter from the given generator.
    pub fn delays_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<Duration> {
        let jitter_ms = u64::try_from(self.max_jitter.as_millis()).unwrap_or(u64::MAX);
        let mut floor = Duration::ZERO;

        (0..self.max_attempts.saturating_sub(1))
            .map(|k| {
                let backoff = self.base_delay.saturating_mul(2u32.saturating_pow(k));
                let jitter = if jitter_ms == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rng.gen_range(0..=jitter_ms))
                };
                floor = floor.max(backoff.saturating_add(jitter));
                floor
            })
            .collect()
    }

    /// Run `action` under this policy.
    ///
    /// Rate-limited failures are retried after the scheduled delay. When the
    /// last attempt is still rate limited, a terminal
    /// [`ExtractionErrorKind::ServiceOverloaded`] is returned instead of the
    /// final service error. Any other failure is returned unchanged.
    #[instrument(skip(self, action), fields(max_attempts = self.max_attempts))]
    pub async fn execute<T, F, Fut>(&self, operation: &str, action: F) -> LorebookResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = LorebookResult<T>>,
    {
        let delays = self.delays();
        debug!(?delays, "Backoff schedule");

        let max_attempts = self.max_attempts;
        let attempts = AtomicU32::new(0);
        let attempts = &attempts;
        let action = &action;

        Retry::spawn(delays, move || async move {
            let attempt = attempts.fetch_add(1, Ordering::SeqCst) + 1;
            match action().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "Succeeded after retry");
                    }
                    Ok(value)
                }
                Err(e) if e.is_rate_limited() && attempt < max_attempts => {
                    warn!(attempt, max_attempts, error = %e, "Rate limited, backing off");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) if e.is_rate_limited() => {
                    warn!(attempt, error = %e, "Still rate limited, giving up");
                    Err(RetryError::Permanent(LorebookError::from(
                        ExtractionError::new(ExtractionErrorKind::ServiceOverloaded {
                            attempts: attempt,
                        }),
                    )))
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Non-retryable failure");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lorebook_error::{GeminiError, GeminiErrorKind, LorebookErrorKind};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Mutex;
    use tokio::time::Instant;

    fn quota_error() -> LorebookError {
        GeminiError::new(GeminiErrorKind::HttpError {
            status_code: 429,
            message: "RESOURCE_EXHAUSTED".to_string(),
        })
        .into()
    }

    fn auth_error() -> LorebookError {
        GeminiError::new(GeminiErrorKind::HttpError {
            status_code: 401,
            message: "API key not valid".to_string(),
        })
        .into()
    }

    #[test]
    fn test_delays_follow_doubling_within_jitter() {
        let policy = RetryPolicy::default();
        let mut rng = StdRng::seed_from_u64(7);
        let delays = policy.delays_with(&mut rng);

        assert_eq!(delays.len(), 4);
        for (k, delay) in delays.iter().enumerate() {
            let base = Duration::from_millis(5000 * 2u64.pow(k as u32));
            assert!(*delay >= base, "delay {k} below base");
            assert!(*delay <= base + Duration::from_millis(2000), "delay {k} above jitter");
        }
    }

    #[test]
    fn test_delays_never_decrease_even_with_large_jitter() {
        let policy = RetryPolicy::new(6, Duration::from_millis(1), Duration::from_millis(10_000));
        for seed in 0..50 {
            let delays = policy.delays_with(&mut StdRng::seed_from_u64(seed));
            assert!(delays.windows(2).all(|pair| pair[0] <= pair[1]));
        }
    }

    #[test]
    fn test_single_attempt_policy_has_no_delays() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1), Duration::ZERO);
        assert_eq!(*policy.max_attempts(), 1);
        assert!(policy.delays().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_always_rate_limited_hits_ceiling() {
        let policy = RetryPolicy::default();
        let calls = Mutex::new(Vec::new());

        let result: LorebookResult<()> = policy
            .execute("test", || async {
                calls.lock().unwrap().push(Instant::now());
                Err(quota_error())
            })
            .await;

        let calls = calls.into_inner().unwrap();
        assert_eq!(calls.len(), 5);

        let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(gaps.windows(2).all(|pair| pair[0] <= pair[1]));
        assert!(gaps[0] >= Duration::from_millis(5000));

        let err = result.unwrap_err();
        match err.kind() {
            LorebookErrorKind::Extraction(e) => {
                assert_eq!(e.kind, ExtractionErrorKind::ServiceOverloaded { attempts: 5 });
            }
            other => panic!("expected overloaded error, got {other}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_rate_limited_failure_is_not_retried() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result: LorebookResult<()> = policy
            .execute("test", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(auth_error())
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result.unwrap_err().kind(), LorebookErrorKind::Gemini(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let policy = RetryPolicy::default();
        let calls = AtomicU32::new(0);

        let result = policy
            .execute("test", || async {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n < 2 { Err(quota_error()) } else { Ok("done") }
            })
            .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
