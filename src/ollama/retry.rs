//! Bounded retry with increasing delay around analyzer calls.
//!
//! Retry behavior is an explicit policy value rather than an implicit
//! decorator: callers construct (or default) a [`RetryPolicy`] and wrap
//! individual collaborator calls with it. When attempts exhaust, the last
//! error is surfaced so the caller can fall back deterministically instead
//! of blocking.

use std::future::Future;
use std::time::Duration;

use backoff::ExponentialBackoff;
use backoff::backoff::Backoff;

use crate::error::AnalyzerError;

/// Bounded-attempt backoff configuration.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// A policy that never sleeps, for tests.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            multiplier: 1.0,
        }
    }

    /// Run `attempt` up to `max_attempts` times, sleeping with increasing
    /// delay between failures.
    ///
    /// The final error is wrapped in `AnalyzerError::RetriesExhausted`.
    pub async fn run<T, Fut, F>(&self, mut attempt: F) -> Result<T, AnalyzerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, AnalyzerError>>,
    {
        let mut backoff = ExponentialBackoff {
            initial_interval: self.base_delay,
            current_interval: self.base_delay,
            multiplier: self.multiplier,
            max_interval: Duration::from_secs(30),
            max_elapsed_time: None,
            ..Default::default()
        };

        let mut attempts = 0;
        let mut last_error = None;

        while attempts < self.max_attempts {
            attempts += 1;

            match attempt().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    last_error = Some(e);

                    if attempts < self.max_attempts
                        && let Some(wait) = backoff.next_backoff()
                    {
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        match last_error {
            Some(e) => Err(AnalyzerError::RetriesExhausted(Box::new(e))),
            // max_attempts == 0 never ran the closure.
            None => Err(AnalyzerError::RetriesExhausted(Box::new(
                AnalyzerError::InvalidJson("no attempts were made".to_string()),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_on_first_attempt() {
        let policy = RetryPolicy::default();
        let result = policy.run(|| async { Ok("ok") }).await;
        assert_eq!(result.unwrap(), "ok");
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhausts_after_max_attempts() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();

        let policy = RetryPolicy::default();
        let result: Result<(), _> = policy
            .run(move || {
                let c = count_clone.clone();
                async move {
                    c.fetch_add(1, Ordering::SeqCst);
                    Err(AnalyzerError::Timeout(1))
                }
            })
            .await;

        assert!(matches!(result, Err(AnalyzerError::RetriesExhausted(_))));
        assert_eq!(count.load(Ordering::SeqCst), policy.max_attempts);
    }

    #[tokio::test(start_paused = true)]
    async fn test_recovers_after_transient_failures() {
        let count = Arc::new(AtomicU32::new(0));
        let count_clone = count.clone();

        let result = RetryPolicy::default()
            .run(move || {
                let c = count_clone.clone();
                async move {
                    if c.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AnalyzerError::Timeout(1))
                    } else {
                        Ok("recovered")
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_immediate_policy_does_not_sleep() {
        let start = std::time::Instant::now();
        let result: Result<(), _> = RetryPolicy::immediate(3)
            .run(|| async { Err(AnalyzerError::Timeout(1)) })
            .await;
        assert!(matches!(result, Err(AnalyzerError::RetriesExhausted(_))));
        assert!(start.elapsed() < Duration::from_millis(500));
    }
}
