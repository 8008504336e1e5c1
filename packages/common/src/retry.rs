use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::debug;

use crate::storage::StorageError;

/// A single failed attempt.
#[derive(Debug, Clone)]
pub struct RetryAttempt {
    /// 1-based attempt number.
    pub attempt: u8,
    /// Error message from the failed attempt.
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

impl RetryAttempt {
    pub fn new(attempt: u8, error: impl Into<String>) -> Self {
        Self {
            attempt,
            error: error.into(),
            timestamp: Utc::now(),
        }
    }
}

/// How often and how patiently to retry transient storage failures.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u8,
    pub base_ms: u64,
    pub max_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_ms: 100,
            max_ms: 1000,
        }
    }
}

/// Final result of [`retry_transient`] plus every failed attempt on the way.
#[derive(Debug)]
pub struct RetryOutcome<T> {
    pub result: Result<T, StorageError>,
    pub history: Vec<RetryAttempt>,
}

impl<T> RetryOutcome<T> {
    /// Total number of attempts made, including the last one.
    pub fn attempts(&self) -> usize {
        match self.result {
            Ok(_) => self.history.len() + 1,
            Err(_) => self.history.len(),
        }
    }

    /// One line per failed attempt, for log fields.
    pub fn failures(&self) -> Vec<String> {
        self.history
            .iter()
            .map(|a| format!("#{} at {}: {}", a.attempt, a.timestamp.to_rfc3339(), a.error))
            .collect()
    }
}

/// Calculate exponential backoff delay with jitter.
///
/// Formula: `min(base_ms * 2^(attempt-1) + jitter, max_ms)` (0-25% jitter)
pub fn calculate_backoff(attempt: u8, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let exp_factor = 2u64.saturating_pow((attempt - 1) as u32);
    let delay_ms = base_ms.saturating_mul(exp_factor);

    let jitter = if delay_ms > 0 {
        rand::rng().random_range(0..=delay_ms / 4)
    } else {
        0
    };

    let total_delay = delay_ms.saturating_add(jitter).min(max_ms);
    Duration::from_millis(total_delay)
}

/// Run `op`, retrying with backoff while it fails with a transient error.
///
/// Non-transient errors end the loop immediately.
pub async fn retry_transient<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> RetryOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StorageError>>,
{
    let mut history = Vec::new();
    let mut attempt: u8 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        match op().await {
            Ok(value) => {
                return RetryOutcome {
                    result: Ok(value),
                    history,
                };
            }
            Err(err) => {
                history.push(RetryAttempt::new(attempt, err.to_string()));
                if !err.is_transient() || attempt > policy.max_retries {
                    return RetryOutcome {
                        result: Err(err),
                        history,
                    };
                }
                let delay = calculate_backoff(attempt, policy.base_ms, policy.max_ms);
                debug!(attempt, ?delay, error = %err, "Transient storage failure, backing off");
                tokio::time::sleep(delay).await;
            }
        }
    }
}
