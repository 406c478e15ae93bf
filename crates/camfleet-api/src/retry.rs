// Bounded retry with exponential backoff
//
// Generic over any fallible async operation. Callers must ensure the
// operation is safe to repeat -- no idempotency check is (or can be)
// performed here.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Retry schedule: attempt count and base delay.
///
/// The delay after failed attempt `i` (zero-based) is `base_delay * 2^i`;
/// no delay follows the final attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay to sleep after failed attempt `attempt` (zero-based).
    fn backoff(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Run `op` until it succeeds or `policy.max_attempts` is exhausted,
/// sleeping `base_delay * 2^i` between attempts.
///
/// Propagates the error from the final attempt when all are exhausted.
pub async fn retry<T, E, F, Fut>(policy: RetryPolicy, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let attempts = policy.max_attempts.max(1);
    let mut last_err = None;

    for attempt in 0..attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                warn!(
                    attempt = attempt + 1,
                    max = attempts,
                    error = %err,
                    "operation failed, retrying"
                );
                last_err = Some(err);

                if attempt + 1 < attempts {
                    tokio::time::sleep(policy.backoff(attempt)).await;
                }
            }
        }
    }

    // attempts >= 1, so at least one Err was recorded.
    Err(last_err.expect("retry ran at least one attempt"))
}
