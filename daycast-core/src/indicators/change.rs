//! Close-to-close change: close[t] - close[t-1].

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Default)]
pub struct CloseChange;

impl Indicator for CloseChange {
    fn name(&self) -> &str {
        "close_change"
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let mut result = vec![f64::NAN; bars.len()];
        for (i, pair) in bars.windows(2).enumerate() {
            result[i + 1] = pair[1].close - pair[0].close;
        }
        result
    }
}
