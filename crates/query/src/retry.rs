//! Retry policy for query fetches.

use std::future::Future;
use std::time::Duration;

use backoffice_client::ServiceError;

/// Exponential backoff: retry `n` waits `min(base * 2^(n-1), max)`.
///
/// No jitter: the delays are part of the observable contract
/// (1000, 2000, 4000 ms with the defaults).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt (0 = no retries).
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with no retries.
    pub fn no_retry() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before retry `retry` (1-indexed).
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }

        let factor = 2u32.checked_pow(retry - 1).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Whether another attempt is allowed after `retries_done` retries failed with `err`.
    pub fn should_retry(&self, retries_done: u32, err: &ServiceError) -> bool {
        retries_done < self.max_retries && err.is_retryable()
    }

    /// Run `op` until it succeeds, fails permanently or runs out of retries.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, ServiceError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ServiceError>>,
    {
        let mut retries = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if self.should_retry(retries, &err) => {
                    retries += 1;
                    let delay = self.delay_for_retry(retries);
                    tracing::warn!(
                        query = %what,
                        retry = retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "fetch failed; retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn network() -> ServiceError {
        ServiceError::Network {
            message: "Failed to fetch products".into(),
            detail: "connection reset".into(),
        }
    }

    #[test]
    fn default_delays_double_and_cap() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(0), Duration::ZERO);
        assert_eq!(policy.delay_for_retry(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_retry(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_for_retry(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_for_retry(5), Duration::from_millis(16_000));
        assert_eq!(policy.delay_for_retry(6), Duration::from_millis(30_000));
        assert_eq!(policy.delay_for_retry(40), Duration::from_millis(30_000));
    }

    #[test]
    fn should_retry_respects_budget_and_error_kind() {
        let policy = RetryPolicy::default();
        assert!(policy.should_retry(0, &network()));
        assert!(policy.should_retry(2, &network()));
        assert!(!policy.should_retry(3, &network()));
        assert!(!policy.should_retry(0, &ServiceError::api(404, "Product not found")));
        assert!(!RetryPolicy::no_retry().should_retry(0, &network()));
    }

    #[tokio::test(start_paused = true)]
    async fn run_gives_up_after_max_retries() {
        let mut calls = 0;
        let started = tokio::time::Instant::now();

        let result: Result<(), _> = RetryPolicy::default()
            .run("products", || {
                calls += 1;
                async { Err(network()) }
            })
            .await;

        assert_eq!(result, Err(network()));
        assert_eq!(calls, 4);
        assert_eq!(started.elapsed(), Duration::from_millis(7000));
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_on_first_success() {
        let mut calls = 0;
        let result = RetryPolicy::default()
            .run("products", || {
                calls += 1;
                let attempt = calls;
                async move { if attempt < 2 { Err(network()) } else { Ok(attempt) } }
            })
            .await;

        assert_eq!(result, Ok(2));
    }
}
