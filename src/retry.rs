//! Bounded retry with a caller-supplied classification of errors.
//!
//! [`retry`] keeps calling an operation while it fails with an error the
//! predicate marks as retryable, backing off exponentially, until it
//! succeeds, fails terminally, or the policy's timeout elapses. Every wait
//! goes through the tokio timer, so dropping the returned future cancels
//! both the in-flight attempt and any pending backoff.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, warn};

/// Timing parameters for [`retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total time budget across all attempts and waits.
    pub timeout: Duration,
    /// Wait after the first retryable failure.
    pub min_delay: Duration,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Policy with the given budget and the default backoff (500ms doubling to 10s).
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }

    /// Backoff before attempt `attempt + 1`, where `attempt` starts at 1.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.min_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Why [`retry`] gave up.
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// The operation failed with an error the predicate did not accept.
    #[error("{0}")]
    Terminal(E),

    /// The time budget ran out while the operation kept failing retryably.
    #[error("timed out after {attempts} attempt(s) over {elapsed:?}")]
    Timeout {
        /// Attempts started, including one cut short by the deadline.
        attempts: u32,
        /// Time spent before giving up.
        elapsed: Duration,
        /// The last retryable error observed, if an attempt completed.
        last: Option<E>,
    },
}

/// Run `operation` until it succeeds, fails terminally, or `policy.timeout` elapses.
///
/// `operation` receives the 1-based attempt number. An error for which
/// `is_retryable` returns `true` is retried after a backoff; any other error
/// is returned immediately as [`RetryError::Terminal`].
pub async fn retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    is_retryable: P,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
{
    let started = Instant::now();
    let deadline = started + policy.timeout;
    let mut last = None;
    let mut attempt = 0u32;

    loop {
        attempt += 1;
        let remaining = deadline.saturating_duration_since(Instant::now());

        let err = match timeout(remaining, operation(attempt)).await {
            Ok(Ok(value)) => {
                debug!(attempt, "operation succeeded");
                return Ok(value);
            },
            Ok(Err(err)) if is_retryable(&err) => err,
            Ok(Err(err)) => return Err(RetryError::Terminal(err)),
            Err(_) => {
                return Err(RetryError::Timeout {
                    attempts: attempt,
                    elapsed: started.elapsed(),
                    last,
                })
            },
        };

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(RetryError::Timeout {
                attempts: attempt,
                elapsed: started.elapsed(),
                last: Some(err),
            });
        }

        let delay = policy.delay_for_attempt(attempt).min(remaining);
        warn!(attempt, ?delay, "retryable failure, backing off");
        last = Some(err);
        sleep(delay).await;
    }
}
