//! Daily price bar.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Direction;

/// One trading day of open, high, low, close and volume.
///
/// Within a fetched series dates strictly increase and never repeat
/// (see `data::canonicalize`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

impl Bar {
    /// A bar with any undefined price. Providers emit these for days the
    /// exchange reported without a full quote.
    pub fn is_void(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .any(|p| p.is_nan())
    }

    /// Positive prices with the open and close inside the day's range.
    pub fn is_sane(&self) -> bool {
        !self.is_void()
            && self.low > 0.0
            && self.low <= self.high
            && (self.low..=self.high).contains(&self.open)
            && (self.low..=self.high).contains(&self.close)
    }

    /// Up when this close is strictly above `prev`'s close; a flat day is Down.
    pub fn direction_since(&self, prev: &Bar) -> Direction {
        if self.close > prev.close {
            Direction::Up
        } else {
            Direction::Down
        }
    }
}
