//! Retry logic with exponential backoff for remote model calls.
//!
//! Errors are carried as strings so HTTP status text can drive
//! [`is_retryable_error`]; permanent failures stop the loop early.

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::{Duration, Instant};
use tokio::time::sleep;

/// Configuration for retry behavior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Maximum number of retry attempts after the first try.
    pub max_retries: u32,
    /// Initial delay between retries (base for exponential backoff) in milliseconds.
    #[serde(with = "crate::serde_millis")]
    pub base_delay: Duration,
    /// Maximum delay between retries in milliseconds.
    #[serde(with = "crate::serde_millis")]
    pub max_delay: Duration,
    pub backoff_multiplier: f64,
    /// Add random jitter to prevent synchronized retries.
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            backoff_multiplier: 2.0,
            jitter: true,
        }
    }
}

impl RetryConfig {
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
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

    /// Calculate delay for a specific retry attempt (0-indexed; attempt 0 never waits).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponential =
            self.base_delay.as_millis() as f64 * self.backoff_multiplier.powi((attempt - 1) as i32);
        let delay_ms = exponential.min(self.max_delay.as_millis() as f64) as u64;

        // +/-25% jitter
        if self.jitter {
            let jitter_range = delay_ms / 4;
            if jitter_range > 0 {
                let jitter = fastrand::u64(0..jitter_range * 2);
                return Duration::from_millis(delay_ms.saturating_sub(jitter_range) + jitter);
            }
        }

        Duration::from_millis(delay_ms)
    }
}

/// Result of a retryable operation.
#[derive(Debug, Clone)]
pub struct RetryResult<T> {
    /// The final result (success or last error).
    pub result: Result<T, String>,
    /// Number of attempts made (1 = first try succeeded).
    pub attempts: u32,
    pub total_duration: Duration,
    pub succeeded: bool,
}

impl<T> RetryResult<T> {
    pub fn into_result(self) -> Result<T, String> {
        self.result
    }
}

/// Execute an async operation with retry logic.
///
/// The closure receives the 0-based attempt number. Errors for which
/// [`is_retryable_error`] is false end the loop immediately.
///
/// # Example
/// ```
/// use semantic::retry::{RetryConfig, execute_with_retry_async};
/// use std::time::Duration;
///
/// async fn example() {
///     let config = RetryConfig::default()
///         .with_max_retries(3)
///         .with_base_delay(Duration::from_millis(100));
///
///     let result = execute_with_retry_async(&config, |attempt| async move {
///         if attempt == 0 {
///             Err("connection reset".to_string())
///         } else {
///             Ok("success")
///         }
///     }).await;
///
///     assert!(result.succeeded);
/// }
/// ```
pub async fn execute_with_retry_async<T, F, Fut>(
    config: &RetryConfig,
    mut operation: F,
) -> RetryResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, String>>,
{
    let start = Instant::now();
    let mut last_error = None;
    let mut attempts = 0;

    for attempt in 0..=config.max_retries {
        attempts = attempt + 1;
        match operation(attempt).await {
            Ok(value) => {
                return RetryResult {
                    result: Ok(value),
                    attempts,
                    total_duration: start.elapsed(),
                    succeeded: true,
                };
            }
            Err(e) => {
                let retryable = is_retryable_error(&e);
                if attempt < config.max_retries && retryable {
                    tracing::debug!(attempt = attempt + 1, error = %e, "retrying remote call");
                }
                last_error = Some(e);
                if !retryable {
                    break;
                }
                if attempt < config.max_retries {
                    let delay = config.calculate_delay(attempt + 1);
                    if !delay.is_zero() {
                        sleep(delay).await;
                    }
                }
            }
        }
    }

    RetryResult {
        result: Err(last_error.unwrap_or_else(|| "all retries exhausted".to_string())),
        attempts,
        total_duration: start.elapsed(),
        succeeded: false,
    }
}

/// Determine if an error is retryable based on transport wording and HTTP status codes.
pub fn is_retryable_error(error: &str) -> bool {
    let error_lower = error.to_lowercase();

    if error_lower.contains("timeout")
        || error_lower.contains("timed out")
        || error_lower.contains("connection")
        || error_lower.contains("reset")
        || error_lower.contains("refused")
        || error_lower.contains("dns")
        || error_lower.contains("unreachable")
    {
        return true;
    }

    if error_lower.contains("503")
        || error_lower.contains("502")
        || error_lower.contains("504")
        || error_lower.contains("429")
        || error_lower.contains("500")
        || error_lower.contains("524")
    {
        return true;
    }

    if error_lower.contains("400")
        || error_lower.contains("401")
        || error_lower.contains("403")
        || error_lower.contains("404")
        || error_lower.contains("422")
        || error_lower.contains("invalid")
    {
        return false;
    }

    true
}
