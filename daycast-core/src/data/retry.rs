//! Fixed-backoff retry around a single-attempt provider.

use super::canonicalize::canonicalize;
use super::provider::{DataError, DataProvider, HistoryWindow};
use crate::domain::Bar;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Pause between consecutive attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    /// Same attempt count with no pause, for tests and offline sources.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }
}

/// Fetch canonical bars for `symbol`, retrying failed or empty attempts.
///
/// Sleeps `policy.backoff` between attempts (never after the last one).
/// Errors that cannot succeed on retry end the loop immediately. Returns the
/// last error once all attempts are spent.
pub fn fetch_history(
    provider: &dyn DataProvider,
    symbol: &str,
    window: HistoryWindow,
    policy: &RetryPolicy,
) -> Result<Vec<Bar>, DataError> {
    let attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=attempts {
        let outcome = provider.fetch_once(symbol, window).and_then(|fetched| {
            let bars = canonicalize(fetched.bars);
            if bars.is_empty() {
                Err(DataError::Empty {
                    symbol: symbol.to_string(),
                })
            } else {
                Ok(bars)
            }
        });

        match outcome {
            Ok(bars) => {
                tracing::info!(
                    provider = provider.name(),
                    symbol,
                    attempt,
                    bars = bars.len(),
                    "fetched price history"
                );
                return Ok(bars);
            }
            Err(e) => {
                tracing::warn!(
                    provider = provider.name(),
                    symbol,
                    attempt,
                    max_attempts = attempts,
                    error = %e,
                    "fetch attempt failed"
                );
                if !e.is_retryable() {
                    return Err(e);
                }
                last_error = Some(e);
            }
        }

        if attempt < attempts && !policy.backoff.is_zero() {
            std::thread::sleep(policy.backoff);
        }
    }

    Err(last_error.unwrap_or_else(|| DataError::Other("no fetch attempts made".into())))
}
