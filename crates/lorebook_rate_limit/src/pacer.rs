//! Fixed-interval spacing between consecutive requests.

use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Keeps consecutive service requests at least `interval` apart.
///
/// The time a request took counts toward the interval, so a slow call is
/// followed by a shorter sleep (or none at all).
///
/// # Examples
///
/// ```
/// use lorebook_rate_limit::Pacer;
/// use std::time::Duration;
///
/// let pacer = Pacer::new(Duration::from_millis(4000));
/// assert_eq!(pacer.remaining(Duration::from_millis(1500)), Duration::from_millis(2500));
/// assert_eq!(pacer.remaining(Duration::from_secs(9)), Duration::ZERO);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    interval: Duration,
}

impl Pacer {
    /// Create a pacer with the given minimum request interval.
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Configured interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sleep still owed after a request that took `elapsed`.
    pub fn remaining(&self, elapsed: Duration) -> Duration {
        self.interval.saturating_sub(elapsed)
    }

    /// Sleep out the rest of the interval that began at `started`.
    ///
    /// Returns `false` if `cancel` fired before the interval elapsed.
    pub async fn pace(&self, started: Instant, cancel: &CancellationToken) -> bool {
        let wait = self.remaining(started.elapsed());
        if wait.is_zero() {
            return !cancel.is_cancelled();
        }

        debug!(wait_ms = wait.as_millis() as u64, "Pacing before next request");
        tokio::select! {
            _ = cancel.cancelled() => false,
            _ = tokio::time::sleep(wait) => true,
        }
    }
}
