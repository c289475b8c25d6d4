//! CSV import provider.
//!
//! Reads `{dir}/{SYMBOL}.csv` with the header `Date,Open,High,Low,Close,Volume`
//! (the layout Yahoo's download button produces). Extra columns such as
//! `Adj Close` are ignored.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, HistoryWindow};
use crate::domain::{is_file_safe, Bar};
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Open")]
    open: Option<f64>,
    #[serde(rename = "High")]
    high: Option<f64>,
    #[serde(rename = "Low")]
    low: Option<f64>,
    #[serde(rename = "Close")]
    close: Option<f64>,
    #[serde(rename = "Volume")]
    volume: Option<f64>,
}

pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `{dir}/{SYMBOL}.csv`. Symbols that would leave `dir` are rejected.
    pub fn path_for(&self, symbol: &str) -> Result<PathBuf, DataError> {
        if !is_file_safe(symbol) {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(self.dir.join(format!("{}.csv", symbol.to_uppercase())))
    }
}

/// Accepts `YYYY-MM-DD`, optionally followed by a time component.
fn parse_date(raw: &str) -> Result<NaiveDate, DataError> {
    let day = raw.trim().get(..10).unwrap_or(raw.trim());
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|e| DataError::Parse(format!("bad date {raw:?}: {e}")))
}

/// Read bars from a CSV file, keeping those inside `window`.
pub fn read_bars(path: &Path, window: HistoryWindow) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| DataError::Io(format!("{}: {e}", path.display())))?;

    let mut bars = Vec::new();
    for (line, record) in reader.deserialize::<CsvRow>().enumerate() {
        let row = record.map_err(|e| DataError::Parse(format!("row {}: {e}", line + 2)))?;
        let date = parse_date(&row.date)?;
        if !window.contains(date) {
            continue;
        }
        bars.push(Bar {
            date,
            open: row.open.unwrap_or(f64::NAN),
            high: row.high.unwrap_or(f64::NAN),
            low: row.low.unwrap_or(f64::NAN),
            close: row.close.unwrap_or(f64::NAN),
            volume: row.volume.map(|v| v.max(0.0) as u64).unwrap_or(0),
        });
    }
    Ok(bars)
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv_import"
    }

    fn fetch_once(&self, symbol: &str, window: HistoryWindow) -> Result<FetchResult, DataError> {
        let path = self.path_for(symbol)?;
        if !path.exists() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        tracing::debug!(path = %path.display(), "reading csv");
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: read_bars(&path, window)?,
            source: DataSource::CsvImport,
        })
    }
}
