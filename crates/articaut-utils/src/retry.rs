//! Retry policy with exponential backoff.
//!
//! Grounded on the teacher's `riptide-utils::retry::RetryPolicy`; narrowed to
//! the transport's exact contract (SPEC_FULL.md §4.C): at most two retries,
//! 1s base delay doubling per attempt, and retries are skipped entirely for
//! errors the caller marks non-retryable (security errors in particular must
//! never retry).

use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3, initial_backoff_ms: 1000, max_backoff_ms: 30_000, backoff_multiplier: 2.0 }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_backoff_ms: u64, max_backoff_ms: u64, backoff_multiplier: f64) -> Self {
        Self { max_attempts, initial_backoff_ms, max_backoff_ms, backoff_multiplier }
    }

    /// The transport-level policy: an initial attempt plus up to two
    /// retries, 1s * 2^attempt, uncapped below 30s.
    pub fn transport_default() -> Self {
        Self::default()
    }

    pub fn backoff_duration(&self, attempt: usize) -> Duration {
        let backoff_ms =
            (self.initial_backoff_ms as f64 * self.backoff_multiplier.powi(attempt as i32)).min(self.max_backoff_ms as f64) as u64;
        Duration::from_millis(backoff_ms)
    }

    /// Execute `operation`, retrying on failure while `is_retryable` returns
    /// true for the error and attempts remain. `is_retryable` lets the
    /// caller enforce SPEC_FULL.md's "security errors never retry" rule
    /// without this crate knowing about `FetchError`.
    pub async fn execute<F, Fut, T, E>(&self, is_retryable: impl Fn(&E) -> bool, mut operation: F) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0usize;
        loop {
            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        debug!(attempt, "operation succeeded after retry");
                    }
                    return Ok(result);
                }
                Err(err) => {
                    attempt += 1;
                    if attempt >= self.max_attempts || !is_retryable(&err) {
                        warn!(attempt, max_attempts = self.max_attempts, %err, "operation failed, not retrying");
                        return Err(err);
                    }
                    let backoff = self.backoff_duration(attempt - 1);
                    warn!(attempt, max_attempts = self.max_attempts, %err, ?backoff, "retrying after backoff");
                    sleep(backoff).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn transport_default_matches_spec_constants() {
        let policy = RetryPolicy::transport_default();
        assert_eq!(policy.max_attempts, 3);
        assert_eq!(policy.backoff_duration(0).as_millis(), 1000);
        assert_eq!(policy.backoff_duration(1).as_millis(), 2000);
    }

    #[test]
    fn backoff_duration_caps_at_max() {
        let policy = RetryPolicy::new(10, 1000, 5000, 2.0);
        assert_eq!(policy.backoff_duration(10).as_millis(), 5000);
    }

    #[tokio::test]
    async fn execute_retries_until_success() {
        let policy = RetryPolicy::new(3, 1, 10, 2.0);
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let result = policy
            .execute(
                |_: &String| true,
                || {
                    let counter_clone = counter_clone.clone();
                    async move {
                        let n = counter_clone.fetch_add(1, Ordering::SeqCst);
                        if n < 2 {
                            Err("transient".to_string())
                        } else {
                            Ok(42)
                        }
                    }
                },
            )
            .await;
        assert_eq!(result, Ok(42));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn execute_does_not_retry_when_caller_marks_non_retryable() {
        let policy = RetryPolicy::new(5, 1, 10, 2.0);
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let result: Result<i32, String> = policy
            .execute(
                |_| false,
                || {
                    let counter_clone = counter_clone.clone();
                    async move {
                        counter_clone.fetch_add(1, Ordering::SeqCst);
                        Err("ssrf_blocked".to_string())
                    }
                },
            )
            .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn execute_stops_at_max_attempts() {
        let policy = RetryPolicy::new(3, 1, 10, 2.0);
        let counter = Arc::new(AtomicUsize::new(0));
        let counter_clone = counter.clone();
        let result: Result<i32, String> = policy
            .execute(
                |_| true,
                || {
                    let counter_clone = counter_clone.clone();
                    async move {
                        counter_clone.fetch_add(1, Ordering::SeqCst);
                        Err("persistent".to_string())
                    }
                },
            )
            .await;
        assert!(result.is_err());
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }
}
