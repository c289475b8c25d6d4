//! Deterministic synthetic bars for offline runs and tests.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, HistoryWindow};
use crate::domain::Bar;
use crate::rng::RngHierarchy;
use chrono::{Datelike, NaiveDate, Weekday};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shape of the generated close series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyntheticPattern {
    /// Multiplicative random walk, seeded per symbol.
    RandomWalk { seed: u64, start_price: f64 },
    /// Closes alternate `low, high, low, ...`.
    Alternating { low: f64, high: f64 },
}

impl Default for SyntheticPattern {
    fn default() -> Self {
        SyntheticPattern::RandomWalk {
            seed: 42,
            start_price: 100.0,
        }
    }
}

pub struct SyntheticProvider {
    pattern: SyntheticPattern,
}

impl SyntheticProvider {
    pub fn new(pattern: SyntheticPattern) -> Self {
        Self { pattern }
    }
}

/// Weekdays in `[start, end]`.
pub fn trading_days(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|d| *d <= end)
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .collect()
}

/// Bars whose open is the previous close and whose range brackets both.
pub fn bars_from_closes(dates: &[NaiveDate], closes: &[f64]) -> Vec<Bar> {
    dates
        .iter()
        .zip(closes)
        .enumerate()
        .map(|(i, (&date, &close))| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date,
                open,
                high: open.max(close) + 0.5,
                low: open.min(close) - 0.5,
                close,
                volume: 1_000_000 + (i as u64 % 7) * 10_000,
            }
        })
        .collect()
}

pub fn alternating_bars(dates: &[NaiveDate], low: f64, high: f64) -> Vec<Bar> {
    let closes: Vec<f64> = (0..dates.len())
        .map(|i| if i % 2 == 0 { low } else { high })
        .collect();
    bars_from_closes(dates, &closes)
}

pub fn random_walk_bars(dates: &[NaiveDate], symbol: &str, seed: u64, start_price: f64) -> Vec<Bar> {
    let mut rng = RngHierarchy::new(seed).rng_for(symbol, 0);
    let mut price = start_price;
    let closes: Vec<f64> = dates
        .iter()
        .map(|_| {
            price *= 1.0 + rng.gen_range(-0.02..0.02);
            price
        })
        .collect();
    bars_from_closes(dates, &closes)
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch_once(&self, symbol: &str, window: HistoryWindow) -> Result<FetchResult, DataError> {
        let dates = trading_days(window.start, window.end);
        let bars = match self.pattern {
            SyntheticPattern::RandomWalk { seed, start_price } => {
                random_walk_bars(&dates, symbol, seed, start_price)
            }
            SyntheticPattern::Alternating { low, high } => alternating_bars(&dates, low, high),
        };
        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}
