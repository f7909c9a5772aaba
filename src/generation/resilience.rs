//! Timeout and retry around a single provider call
//!
//! The call runs as its own task and races a timer, so a transport that
//! ignores its own timeout still cannot hold the caller past the limit.
//! A timed-out task is aborted and its eventual result is dropped. Dropping
//! the wrapper mid-call aborts the task as well.

use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, warn};

use crate::core::config::GenerationConfig;
use crate::llm::provider::ProviderError;

/// Timeout and backoff settings for one wrapped call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub timeout: Duration,
    /// Attempts after the first one; transient failures only
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            timeout: config.timeout(),
            max_retries: config.max_retries,
            base_delay: config.retry_base_delay(),
            max_delay: config.retry_max_delay(),
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

/// Delay before retry number `retry` (0-based): `min(base * 2^retry, max)`
pub fn backoff_delay(retry: u32, base: Duration, max: Duration) -> Duration {
    2u32.checked_pow(retry)
        .and_then(|factor| base.checked_mul(factor))
        .map_or(max, |delay| delay.min(max))
}

/// Run `request_fn` with a per-attempt timeout and bounded retries
///
/// Transient failures (including timeouts) back off and retry up to
/// `max_retries` times. Permanent failures return after one attempt.
pub async fn call_with_resilience<T, F, Fut>(
    policy: &RetryPolicy,
    mut request_fn: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
    T: Send + 'static,
{
    let attempts = policy.max_attempts();
    let mut retry = 0;

    loop {
        let attempt = retry + 1;
        let err = match attempt_with_timeout(policy.timeout, request_fn()).await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        if !err.is_transient() {
            warn!(attempt, error = %err, "Provider call failed permanently");
            return Err(err);
        }
        if attempt >= attempts {
            error!(attempts, error = %err, "Provider call failed after all retries");
            return Err(err);
        }

        let delay = backoff_delay(retry, policy.base_delay, policy.max_delay);
        warn!(
            attempt,
            attempts,
            error = %err,
            delay_secs = delay.as_secs_f64(),
            "Provider call failed, retrying"
        );
        tokio::time::sleep(delay).await;
        retry += 1;
    }
}

/// Aborts the wrapped task when dropped, so an abandoned attempt stops too
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn attempt_with_timeout<T, Fut>(limit: Duration, call: Fut) -> Result<T, ProviderError>
where
    Fut: Future<Output = Result<T, ProviderError>> + Send + 'static,
    T: Send + 'static,
{
    let mut task = AbortOnDrop(tokio::spawn(call));

    match tokio::time::timeout(limit, &mut task.0).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(ProviderError::Transport(format!(
            "provider task ended abnormally: {}",
            join_err
        ))),
        // the guard aborts the task on the way out
        Err(_) => Err(ProviderError::Timeout {
            seconds: limit.as_secs_f64(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            timeout: Duration::from_secs(5),
            max_retries,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(3),
        }
    }

    #[test]
    fn test_backoff_doubles_then_caps() {
        let base = Duration::from_secs(1);
        let max = Duration::from_secs(30);
        let delays: Vec<u64> = (0..7).map(|r| backoff_delay(r, base, max).as_secs()).collect();
        assert_eq!(delays, vec![1, 2, 4, 8, 16, 30, 30]);
        assert_eq!(backoff_delay(64, base, max), max);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_transient_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = call_with_resilience(&policy(3), move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ProviderError::RateLimited("busy".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await;

        assert_eq!(result, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_retries_means_one_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = call_with_resilience(&policy(0), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Err(ProviderError::Transport("reset".into())) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
