//! Raw bar columns exposed through the `Indicator` trait.
//!
//! Lets same-day columns (open/high/low/volume) be lagged with the same
//! `Lagged` wrapper as derived indicators.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

#[derive(Debug, Clone)]
pub struct Field {
    field: BarField,
}

impl Field {
    pub fn new(field: BarField) -> Self {
        Self { field }
    }
}

impl Indicator for Field {
    fn name(&self) -> &str {
        match self.field {
            BarField::Open => "open",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Close => "close",
            BarField::Volume => "volume",
        }
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| match self.field {
                BarField::Open => b.open,
                BarField::High => b.high,
                BarField::Low => b.low,
                BarField::Close => b.close,
                BarField::Volume => b.volume as f64,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_bars;

    #[test]
    fn field_extracts_column() {
        let bars = make_bars(&[10.0, 12.0]);
        assert_eq!(Field::new(BarField::Close).compute(&bars), vec![10.0, 12.0]);
        assert_eq!(Field::new(BarField::Open).compute(&bars), vec![10.0, 10.0]);
        assert_eq!(Field::new(BarField::Volume).compute(&bars), vec![1000.0, 1001.0]);
    }
}
