//! Data provider trait and structured error types.

use crate::domain::Bar;
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from a single fetch attempt.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication required: {0}")]
    AuthenticationRequired(String),

    #[error("provider refused the request (HTTP 403)")]
    Blocked,

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("provider returned no bars for {symbol}")]
    Empty { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DataError::NetworkUnreachable(_)
                | DataError::RateLimited { .. }
                | DataError::ResponseFormatChanged(_)
                | DataError::Empty { .. }
                | DataError::Other(_)
        )
    }
}

/// Inclusive calendar range of bars to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl HistoryWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// The `years` calendar years ending on `end`.
    pub fn trailing_years(end: NaiveDate, years: u32) -> Self {
        let start = end
            .checked_sub_months(Months::new(12 * years))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Two years ending today (local time).
    pub fn default_trailing() -> Self {
        Self::trailing_years(chrono::Local::now().date_naive(), 2)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Synthetic,
}

/// Bars returned by one successful attempt.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub source: DataSource,
}

/// A source of daily bars.
///
/// Implementations make one attempt per call and do not retry; see
/// `fetch_history` for the retry policy.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn fetch_once(&self, symbol: &str, window: HistoryWindow) -> Result<FetchResult, DataError>;
}
