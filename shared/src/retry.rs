//! Bounded retry with increasing delay
//!
//! One policy abstraction shared by the webhook sender (exponential backoff)
//! and the realtime client's reconnect loop (linear backoff), instead of two
//! hand-rolled loops with duplicated delay math.

use std::future::Future;
use std::time::Duration;

/// Delay growth strategy between attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backoff {
    /// `base * 2^n` where n is the number of prior failures (0-indexed)
    Exponential { base: Duration },
    /// `base * (n + 1)` - delays grow as base, 2*base, 3*base, ...
    Linear { base: Duration },
}

/// A bounded retry policy: at most `max_attempts` tries, with a
/// backoff-derived delay between consecutive attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one
    pub max_attempts: u32,
    pub backoff: Backoff,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts,
            backoff,
        }
    }

    /// Webhook delivery policy: 3 retries after the initial attempt,
    /// sleeping 1s, 2s, 4s between attempts.
    pub fn webhook() -> Self {
        Self::new(
            4,
            Backoff::Exponential {
                base: Duration::from_secs(1),
            },
        )
    }

    /// Realtime reconnect policy: 5 attempts with delays
    /// 1000ms, 2000ms, 3000ms, 4000ms, 5000ms before each.
    pub fn reconnect() -> Self {
        Self::new(
            5,
            Backoff::Linear {
                base: Duration::from_millis(1000),
            },
        )
    }

    /// Delay to sleep after the failure of attempt `n` (0-indexed)
    pub fn delay_for(&self, failed_attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Exponential { base } => base * 2u32.saturating_pow(failed_attempt),
            Backoff::Linear { base } => base * (failed_attempt + 1),
        }
    }

    /// Drive an async operation through this policy.
    ///
    /// The operation receives the 0-indexed attempt number. On exhaustion the
    /// last error is returned together with the total attempt count.
    pub async fn run<T, E, F, Fut>(&self, mut op: F) -> Result<T, RetryExhausted<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    attempt += 1;
                    if attempt >= self.max_attempts {
                        return Err(RetryExhausted {
                            attempts: attempt,
                            error,
                        });
                    }
                    let delay = self.delay_for(attempt - 1);
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Attempt failed, retrying after delay"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

/// All attempts failed; carries the final error and how many tries were made
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryExhausted<E> {
    pub attempts: u32,
    pub error: E,
}

impl<E: std::fmt::Display> std::fmt::Display for RetryExhausted<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "all {} attempts failed: {}", self.attempts, self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for RetryExhausted<E> {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[test]
    fn test_exponential_delays() {
        let policy = RetryPolicy::webhook();
        assert_eq!(policy.max_attempts, 4);
        assert_eq!(policy.delay_for(0), Duration::from_secs(1));
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
    }

    #[test]
    fn test_linear_delays() {
        let policy = RetryPolicy::reconnect();
        assert_eq!(policy.max_attempts, 5);
        let expected = [1000u64, 2000, 3000, 4000, 5000];
        for (n, ms) in expected.iter().enumerate() {
            assert_eq!(policy.delay_for(n as u32), Duration::from_millis(*ms));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_exhausts_all_attempts() {
        let policy = RetryPolicy::webhook();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result: Result<(), _> = policy
            .run(|_attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err::<(), _>("connection refused")
                }
            })
            .await;

        let err = result.unwrap_err();
        assert_eq!(err.attempts, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(err.error, "connection refused");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_succeeds_after_failures() {
        let policy = RetryPolicy::reconnect();
        let calls = Arc::new(AtomicU32::new(0));

        let counter = calls.clone();
        let result = policy
            .run(|attempt| {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    if attempt < 2 {
                        Err("not yet")
                    } else {
                        Ok(attempt)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_sleeps_policy_delays() {
        let policy = RetryPolicy::reconnect();
        let start = tokio::time::Instant::now();

        let _: Result<(), _> = policy.run(|_| async { Err::<(), _>("down") }).await;

        // 5 attempts => 4 sleeps: 1000 + 2000 + 3000 + 4000 ms
        assert_eq!(start.elapsed(), Duration::from_millis(10_000));
    }
}
