//! One-bar lag: the value at t is the inner indicator's value at t-1.
//!
//! Wrapping an indicator in `Lagged` guarantees its value for day t uses only
//! bars strictly before t, even when the inner indicator includes bar t.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Lagged<I> {
    inner: I,
    name: String,
}

impl<I: Indicator> Lagged<I> {
    pub fn new(inner: I) -> Self {
        let name = format!("{}_lag1", inner.name());
        Self { inner, name }
    }

    pub fn named(inner: I, name: impl Into<String>) -> Self {
        Self {
            inner,
            name: name.into(),
        }
    }
}

impl<I: Indicator> Indicator for Lagged<I> {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.inner.lookback() + 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let inner = self.inner.compute(bars);
        let mut result = vec![f64::NAN; inner.len()];
        if inner.len() > 1 {
            result[1..].copy_from_slice(&inner[..inner.len() - 1]);
        }
        result
    }
}
