//! Bounded retries with exponential backoff, plus per-call timeouts.
//!
//! Every external call the engine makes (registry lookups, vehicle details,
//! whole cache-population batches) goes through [`RetryPolicy::run`], usually
//! wrapping a [`with_timeout`] future.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::RetrySettings;
use crate::shared::errors::{EngineError, LookupError};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub backoff_multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(200),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(5),
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(s: &RetrySettings) -> Self {
        Self {
            max_attempts: s.max_attempts.max(1),
            initial_delay: Duration::from_millis(s.initial_delay_ms),
            backoff_multiplier: s.backoff_multiplier,
            max_delay: Duration::from_millis(s.max_delay_ms),
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting. Handy in tests.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    fn next_delay(&self, delay: Duration) -> Duration {
        Duration::from_secs_f64(
            (delay.as_secs_f64() * self.backoff_multiplier).min(self.max_delay.as_secs_f64()),
        )
    }

    /// Run `operation` until it succeeds, `should_retry` rejects the error,
    /// or the attempts are exhausted. The last error is returned.
    pub async fn run<F, Fut, T, E>(
        &self,
        operation_name: &str,
        mut operation: F,
        should_retry: impl Fn(&E) -> bool,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut delay = self.initial_delay;
        let mut attempt = 1;

        loop {
            let err = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(operation = operation_name, attempt, "Succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) => err,
            };

            if attempt >= max_attempts || !should_retry(&err) {
                warn!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %err,
                    "Giving up"
                );
                return Err(err);
            }

            warn!(
                operation = operation_name,
                attempt,
                max_attempts,
                error = %err,
                retry_in_ms = delay.as_millis() as u64,
                "Transient failure, retrying"
            );
            tokio::time::sleep(delay).await;
            delay = self.next_delay(delay);
            attempt += 1;
        }
    }
}

/// Bound a registry call by `after`; expiry surfaces as a retryable
/// [`LookupError::Timeout`].
pub async fn with_timeout<T, Fut>(
    operation: &str,
    after: Duration,
    fut: Fut,
) -> Result<T, LookupError>
where
    Fut: Future<Output = Result<T, LookupError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(LookupError::Timeout {
            operation: operation.to_string(),
            after,
        }),
    }
}

/// Same as [`with_timeout`] for engine-level units of work (batches).
pub async fn engine_timeout<T, Fut>(operation: &str, after: Duration, fut: Fut) -> Result<T, EngineError>
where
    Fut: Future<Output = Result<T, EngineError>>,
{
    match tokio::time::timeout(after, fut).await {
        Ok(result) => result,
        Err(_) => Err(EngineError::Timeout {
            operation: operation.to_string(),
            after,
        }),
    }
}
