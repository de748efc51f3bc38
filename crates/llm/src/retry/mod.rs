//! Retry with exponential backoff for provider calls
//!
//! Insight requests are not retried unless configured: `RetryConfig::default()`
//! makes a single attempt. When retries are enabled the delay grows by
//! `backoff_multiplier` per attempt, capped at `max_delay`, with optional ±10%
//! jitter. The error of the last attempt is returned unchanged so callers keep
//! the typed cause.

use rand::Rng;
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Configuration for retry behavior with exponential backoff
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts (excluding initial attempt)
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Cap on any single delay
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::none()
    }
}

impl RetryConfig {
    /// Single attempt, no retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }

    /// Create conservative retry config for production
    pub fn conservative() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 1.5,
            jitter: true,
        }
    }

    /// Create fast retry config for low-latency requirements
    pub fn fast() -> Self {
        Self {
            max_retries: 2,
            initial_delay: Duration::from_millis(25),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: false,
        }
    }

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }
}

/// Trait for errors that can be classified as retryable or non-retryable
pub trait RetryableError: std::fmt::Display {
    /// Returns true if the error is retryable (transient)
    fn is_retryable(&self) -> bool;

    /// Returns the error type for logging purposes
    fn error_type(&self) -> String;
}

/// Execute an async operation with retry logic and exponential backoff.
///
/// Stops at the first success, at the first non-retryable error, or after
/// `max_retries` retries, returning the last error.
pub async fn execute_with_retry<F, Fut, T, E>(config: &RetryConfig, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: RetryableError,
{
    let start_time = Instant::now();
    let mut total_delay = Duration::ZERO;
    let mut attempt = 0u32;

    loop {
        debug!(
            "Attempt {}/{} (total elapsed: {:?})",
            attempt + 1,
            config.max_retries + 1,
            start_time.elapsed()
        );

        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    info!(
                        attempts = attempt + 1,
                        "Operation succeeded after {} retries (total time: {:?}, delays: {:?})",
                        attempt,
                        start_time.elapsed(),
                        total_delay
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if attempt >= config.max_retries || !err.is_retryable() {
                    error!(
                        attempts = attempt + 1,
                        error_type = %err.error_type(),
                        retryable = err.is_retryable(),
                        "Operation failed permanently: {} (elapsed: {:?})",
                        err,
                        start_time.elapsed()
                    );
                    return Err(err);
                }

                let delay = calculate_backoff_delay(config, attempt);
                total_delay += delay;

                warn!(
                    error_type = %err.error_type(),
                    "Operation failed, retrying: {} (attempt {}/{}, delay: {:?})",
                    err,
                    attempt + 1,
                    config.max_retries + 1,
                    delay
                );

                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Calculate backoff delay with exponential backoff and optional jitter
pub(crate) fn calculate_backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base_delay = config.initial_delay.as_millis() as f64;
    let exponential_delay = base_delay * config.backoff_multiplier.powi(attempt as i32);

    let mut delay =
        Duration::from_millis(exponential_delay.min(config.max_delay.as_millis() as f64) as u64);

    if config.jitter {
        let jitter_range = delay.as_millis() as f64 * 0.1;
        if jitter_range > 0.0 {
            let jitter = rand::thread_rng().gen_range(-jitter_range..jitter_range);
            let jittered_delay = (delay.as_millis() as f64 + jitter).max(0.0) as u64;
            delay = Duration::from_millis(jittered_delay);
        }
    }

    delay
}
