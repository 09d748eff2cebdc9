//! Exponential-backoff retries for remote snapshot loads.
//!
//! Only transient failures are retried (see `MatrixError::is_transient`).
//! A missing document or a malformed body fails on the first attempt.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::{MatrixError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Total attempts, including the first one. Zero behaves like one.
    pub max_attempts: u32,
    /// Wait before the second attempt
    pub initial_delay: Duration,
    /// Cap for any single wait
    pub max_delay: Duration,
    /// Growth factor between consecutive waits
    pub backoff_multiplier: f64,
}

impl RetryConfig {
    pub fn new(max_attempts: u32, initial_delay: Duration) -> Self {
        Self {
            max_attempts,
            initial_delay,
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    /// Snapshot documents over HTTP: 3 attempts, waiting 250ms then 500ms.
    pub fn snapshot_fetch() -> Self {
        Self::new(3, Duration::from_millis(250)).with_max_delay(Duration::from_secs(2))
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Waits between consecutive attempts, one fewer than `max_attempts`.
    pub fn schedule(&self) -> impl Iterator<Item = Duration> + '_ {
        (0..self.attempts() - 1).map(move |retry| {
            let millis =
                self.initial_delay.as_millis() as f64 * self.backoff_multiplier.powi(retry as i32);
            Duration::from_millis(millis as u64).min(self.max_delay)
        })
    }

    /// Run `operation` until it succeeds, fails permanently, or attempts run out.
    ///
    /// The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, target: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.attempts();
        let mut waits = self.schedule();
        let mut attempt = 1;

        loop {
            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{}: succeeded on attempt {}/{}", target, attempt, attempts);
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                debug!("{}: not retrying: {}", target, error);
                return Err(error);
            }

            let Some(wait) = waits.next() else {
                warn!("{}: giving up after {} attempts: {}", target, attempts, error);
                return Err(error);
            };

            warn!(
                "{}: attempt {}/{} failed ({}), retrying in {:?}",
                target, attempt, attempts, error, wait
            );
            sleep(wait).await;
            attempt += 1;
        }
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::snapshot_fetch()
    }
}
