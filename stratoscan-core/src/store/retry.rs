//! Bounded retry for store calls that are worth a second attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

/// Fixed-attempt, fixed-delay retry policy.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(500),
        }
    }
}

/// Run `operation` until it succeeds or the policy is exhausted; the last
/// error is returned as-is.
pub async fn retry_async<F, Fut, T, E>(
    operation_name: &str,
    policy: RetryPolicy,
    mut operation: F,
) -> std::result::Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if attempt >= max_attempts {
                    return Err(error);
                }
                tracing::debug!(
                    operation = operation_name,
                    attempt,
                    max_attempts,
                    error = %error,
                    "store call failed, retrying"
                );
                sleep(policy.delay).await;
                attempt += 1;
            }
        }
    }
}
