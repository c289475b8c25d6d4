//! Indicators over a daily bar series.
//!
//! Indicators are pure functions: bar history in, numeric series out, one
//! value per bar. Warm-up positions are `f64::NAN`.
//!
//! # Look-ahead contamination guard
//! No indicator value at bar t may depend on price data from bar t+1 or later.
//! Every indicator must pass the truncated-vs-full series test
//! (`tests/lookahead_test.rs`).

pub mod change;
pub mod field;
pub mod lagged;
pub mod sma;

pub use change::CloseChange;
pub use field::{BarField, Field};
pub use lagged::Lagged;
pub use sma::Sma;

use crate::domain::Bar;

/// Trait for indicators.
///
/// `compute` returns a `Vec<f64>` of the same length as `bars`; the first
/// `lookback()` values are `f64::NAN`.
pub trait Indicator: Send + Sync {
    /// Column name (e.g., "sma_5", "price_change").
    fn name(&self) -> &str;

    /// Number of leading bars with no defined value.
    fn lookback(&self) -> usize;

    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for the first bar), high/low = max/min(open, close) ± 1.0,
/// volume = 1000 + i.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                date: base_date + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000 + i as u64,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
