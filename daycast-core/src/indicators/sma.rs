//! Simple Moving Average (SMA) of close prices.
//!
//! Lookback: period - 1 (first valid value at index period-1). The value at
//! index t averages closes t+1-period..=t, so it includes bar t itself; wrap
//! it in `Lagged` to exclude the current day.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Sma {
    period: usize,
    name: String,
}

impl Sma {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "SMA period must be >= 1");
        Self {
            period,
            name: format!("sma_{period}"),
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }
}

impl Indicator for Sma {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];

        // Running sum over finite closes plus a count of NaNs inside the window.
        let mut sum = 0.0;
        let mut nans = 0usize;

        for i in 0..n {
            let entering = bars[i].close;
            if entering.is_nan() {
                nans += 1;
            } else {
                sum += entering;
            }

            if i >= self.period {
                let leaving = bars[i - self.period].close;
                if leaving.is_nan() {
                    nans -= 1;
                } else {
                    sum -= leaving;
                }
            }

            if i + 1 >= self.period && nans == 0 {
                result[i] = sum / self.period as f64;
            }
        }

        result
    }
}
