//! Bounded retry with exponential backoff for upstream adapters.
//!
//! Both upstream adapters (completions and the prompt provider) share this
//! policy; the core engine never retries.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::relay::errors::RelayResult;

/// Run `op` with bounded attempts and exponential backoff.
///
/// Only retryable failures are retried; anything else surfaces
/// immediately. The delay doubles after each failed attempt.
///
/// # Errors
/// Returns the last error once attempts are exhausted, or the first
/// non-retryable error.
pub async fn retry_with_backoff<T, F, Fut>(
    max_attempts: u32,
    initial_backoff: Duration,
    mut op: F,
) -> RelayResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = RelayResult<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut delay = initial_backoff;
    let mut attempt = 1u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < max_attempts => {
                warn!(attempt, error = %err, "upstream call failed, retrying");
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::relay::errors::RelayError;

    fn throttled() -> RelayError {
        RelayError::UpstreamStatus {
            service: "completions",
            status: 503,
        }
    }

    #[tokio::test]
    async fn test_retryable_failure_eventually_succeeds() {
        let calls = Cell::new(0u32);
        let result = retry_with_backoff(3, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            let attempt = calls.get();
            async move {
                if attempt < 3 {
                    Err(throttled())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_attempts_are_bounded() {
        let calls = Cell::new(0u32);
        let result: RelayResult<()> = retry_with_backoff(3, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            async { Err(throttled()) }
        })
        .await;

        assert!(matches!(
            result,
            Err(RelayError::UpstreamStatus { status: 503, .. })
        ));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_failure_surfaces_immediately() {
        let calls = Cell::new(0u32);
        let result: RelayResult<()> = retry_with_backoff(3, Duration::from_millis(1), || {
            calls.set(calls.get() + 1);
            async { Err(RelayError::InvalidTemplate) }
        })
        .await;

        assert!(matches!(result, Err(RelayError::InvalidTemplate)));
        assert_eq!(calls.get(), 1);
    }
}
