//! Bounded retry with fixed backoff.
//!
//! One parametrized policy serves both flaky call sites: the login flow
//! (retry on any failure) and the per-code lookup (retry only transient
//! outcomes). Exhaustion hands back the last outcome, it never raises.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Retry budget: attempt cap and the pause between attempts.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Runs `op` until `retryable` rejects the outcome or the attempt cap
    /// is reached. Returns the final outcome and the number of attempts
    /// spent on it.
    pub async fn run<T, F, Fut>(&self, mut op: F, retryable: impl Fn(&T) -> bool) -> (T, u32)
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = T>,
    {
        let cap = self.max_attempts.max(1);
        let mut attempt = 1u32;
        let mut outcome = op().await;

        while retryable(&outcome) && attempt < cap {
            debug!(target = "stocksync", attempt, cap, "transient outcome, retrying");
            if !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
            attempt += 1;
            outcome = op().await;
        }

        (outcome, attempt)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[tokio::test]
    async fn terminal_outcome_is_never_retried() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let (outcome, attempts) = policy
            .run(
                || async {
                    calls.set(calls.get() + 1);
                    "done"
                },
                |_| false,
            )
            .await;

        assert_eq!(outcome, "done");
        assert_eq!(attempts, 1);
        assert_eq!(calls.get(), 1);
    }

    #[tokio::test]
    async fn exhaustion_returns_last_outcome() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(3, Duration::ZERO);

        let (outcome, attempts) = policy
            .run(
                || async {
                    calls.set(calls.get() + 1);
                    calls.get()
                },
                |_| true,
            )
            .await;

        assert_eq!(outcome, 3);
        assert_eq!(attempts, 3);
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn recovery_stops_the_loop() {
        let calls = Cell::new(0u32);
        let policy = RetryPolicy::new(5, Duration::ZERO);

        let (outcome, attempts) = policy
            .run(
                || async {
                    calls.set(calls.get() + 1);
                    if calls.get() < 3 { Err(()) } else { Ok(calls.get()) }
                },
                |r: &Result<u32, ()>| r.is_err(),
            )
            .await;

        assert_eq!(outcome, Ok(3));
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn zero_attempt_cap_still_runs_once() {
        let policy = RetryPolicy::new(0, Duration::ZERO);
        let (outcome, attempts) = policy.run(|| async { 7 }, |_| true).await;
        assert_eq!(outcome, 7);
        assert_eq!(attempts, 1);
    }
}
