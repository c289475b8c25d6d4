//! Persistence sinks for the raw bar series.
//!
//! A sink receives the fetched bars and a target (destination plus tab name,
//! the tab defaulting to the symbol) and overwrites whatever was there.
//! Sink failures are reported in the response and never abort a run.

mod csv_sink;
mod parquet;
mod sheets;

pub use csv_sink::CsvSink;
pub use parquet::ParquetSink;
pub use sheets::{GoogleSheetsSink, SheetsConfig};

use daycast_core::domain::{is_file_safe, Bar};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("missing credentials: {0}")]
    Credentials(String),
    #[error("request failed: {0}")]
    Http(String),
    #[error("API returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error("I/O error: {0}")]
    Io(String),
    #[error("encoding error: {0}")]
    Encode(String),
}

/// Where to write: a spreadsheet id or output directory, and a tab/file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkTarget {
    pub destination: String,
    pub tab: String,
}

impl SinkTarget {
    pub fn new(destination: impl Into<String>, tab: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            tab: tab.into(),
        }
    }

    /// File sinks name their output after the tab, so it must stay a plain file stem.
    pub(crate) fn check_file_tab(&self) -> Result<(), PersistenceError> {
        if is_file_safe(&self.tab) {
            Ok(())
        } else {
            Err(PersistenceError::Io(format!(
                "{:?} is not a valid file name",
                self.tab
            )))
        }
    }
}

pub trait TableSink: Send + Sync {
    fn name(&self) -> &str;

    /// Replace the target's contents with `bars`. Returns the number of data
    /// rows written (header excluded).
    fn write(&self, bars: &[Bar], target: &SinkTarget) -> Result<usize, PersistenceError>;
}

pub const SHEET_HEADER: [&str; 6] = ["Date", "Open", "High", "Low", "Close", "Volume"];

/// Header row followed by one row per bar, dates as `YYYY-MM-DD`.
pub fn sheet_rows(bars: &[Bar]) -> Vec<Vec<String>> {
    let mut rows = Vec::with_capacity(bars.len() + 1);
    rows.push(SHEET_HEADER.iter().map(|s| s.to_string()).collect());
    rows.extend(bars.iter().map(|b| {
        vec![
            b.date.format("%Y-%m-%d").to_string(),
            b.open.to_string(),
            b.high.to_string(),
            b.low.to_string(),
            b.close.to_string(),
            b.volume.to_string(),
        ]
    }));
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn sheet_rows_start_with_header() {
        let bars = vec![Bar {
            date: NaiveDate::from_ymd_opt(2024, 7, 1).unwrap(),
            open: 1.5,
            high: 2.0,
            low: 1.0,
            close: 1.75,
            volume: 42,
        }];
        let rows = sheet_rows(&bars);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0], SHEET_HEADER.map(String::from).to_vec());
        assert_eq!(rows[1], vec!["2024-07-01", "1.5", "2", "1", "1.75", "42"]);
    }

    #[test]
    fn empty_series_is_header_only() {
        assert_eq!(sheet_rows(&[]).len(), 1);
    }
}
