//! Bounded retry with linear backoff for fallible async operations.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// How many times to try an operation and how long to wait in between.
///
/// After failed attempt `n` the invoker waits `initial_delay * n` before the
/// next one. There is no jitter and no wait after the final attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
        }
    }

    /// Run exactly once.
    pub const fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Delay to wait after the given (1-based) attempt failed.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay * attempt
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Run `operation` until it succeeds, the policy is exhausted, or it returns
/// an error `should_retry` rejects.
///
/// The last error is returned unmodified.
pub async fn with_retry<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: Fn(&E) -> bool,
    E: fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && should_retry(&err) => {
                let delay = policy.delay_after(attempt);
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %err,
                    "operation failed; retrying after {:?}",
                    delay
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
