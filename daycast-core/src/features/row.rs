//! Feature rows, the fixed model column order, and the row table.

use chrono::NaiveDate;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// One engineered row for day `date`.
///
/// `close` is carried for reporting only; it is never a model input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub price_change: f64,
    pub sma_5: f64,
    pub sma_10: f64,
    pub target: u8,
}

/// Model input columns, in matrix column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureColumn {
    Open,
    High,
    Low,
    Volume,
    PriceChange,
    Sma5,
    Sma10,
}

impl FeatureColumn {
    pub const ALL: [FeatureColumn; 7] = [
        FeatureColumn::Open,
        FeatureColumn::High,
        FeatureColumn::Low,
        FeatureColumn::Volume,
        FeatureColumn::PriceChange,
        FeatureColumn::Sma5,
        FeatureColumn::Sma10,
    ];

    /// Column header used in reports.
    pub fn name(self) -> &'static str {
        match self {
            FeatureColumn::Open => "Open",
            FeatureColumn::High => "High",
            FeatureColumn::Low => "Low",
            FeatureColumn::Volume => "Volume",
            FeatureColumn::PriceChange => "Price_Change",
            FeatureColumn::Sma5 => "SMA_5",
            FeatureColumn::Sma10 => "SMA_10",
        }
    }

    pub fn value(self, row: &FeatureRow) -> f64 {
        match self {
            FeatureColumn::Open => row.open,
            FeatureColumn::High => row.high,
            FeatureColumn::Low => row.low,
            FeatureColumn::Volume => row.volume,
            FeatureColumn::PriceChange => row.price_change,
            FeatureColumn::Sma5 => row.sma_5,
            FeatureColumn::Sma10 => row.sma_10,
        }
    }
}

/// How same-day open/high/low/volume enter the feature set.
///
/// High, low, and volume of day t are only final after day t's close, so
/// `Current` leaks intraday information into a close-direction target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SameDayPolicy {
    /// Use day t's own open/high/low/volume.
    #[default]
    Current,
    /// Use day t-1's open/high/low/volume.
    Lagged,
}

/// Ordered feature rows for one symbol.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureTable {
    rows: Vec<FeatureRow>,
}

impl FeatureTable {
    pub fn new(rows: Vec<FeatureRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[FeatureRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The last `n` rows (fewer if the table is shorter).
    pub fn tail(&self, n: usize) -> &[FeatureRow] {
        &self.rows[self.rows.len().saturating_sub(n)..]
    }

    /// Model matrix over all rows, columns in `FeatureColumn::ALL` order.
    pub fn matrix(&self) -> Array2<f64> {
        let all: Vec<usize> = (0..self.rows.len()).collect();
        self.matrix_for(&all)
    }

    /// Model matrix over the selected row indices, in the given order.
    pub fn matrix_for(&self, indices: &[usize]) -> Array2<f64> {
        let cols = FeatureColumn::ALL.len();
        Array2::from_shape_fn((indices.len(), cols), |(i, j)| {
            FeatureColumn::ALL[j].value(&self.rows[indices[i]])
        })
    }

    pub fn targets(&self) -> Vec<u8> {
        self.rows.iter().map(|r| r.target).collect()
    }

    pub fn targets_for(&self, indices: &[usize]) -> Vec<u8> {
        indices.iter().map(|&i| self.rows[i].target).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn row(day: u32, target: u8) -> FeatureRow {
        FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 10.0,
            price_change: -0.25,
            sma_5: 1.1,
            sma_10: 1.2,
            target,
        }
    }

    #[test]
    fn matrix_excludes_close_and_target() {
        let table = FeatureTable::new(vec![row(1, 1)]);
        let m = table.matrix();
        assert_eq!(m.shape(), &[1, 7]);
        assert_eq!(m.row(0).to_vec(), vec![1.0, 2.0, 0.5, 10.0, -0.25, 1.1, 1.2]);
    }

    #[test]
    fn matrix_for_respects_index_order() {
        let mut second = row(2, 0);
        second.open = 9.0;
        let table = FeatureTable::new(vec![row(1, 1), second]);
        let m = table.matrix_for(&[1, 0]);
        assert_eq!(m[[0, 0]], 9.0);
        assert_eq!(m[[1, 0]], 1.0);
        assert_eq!(table.targets_for(&[1, 0]), vec![0, 1]);
    }

    #[test]
    fn tail_clamps_to_length() {
        let table = FeatureTable::new(vec![row(1, 1), row(2, 0), row(3, 1)]);
        assert_eq!(table.tail(2).len(), 2);
        assert_eq!(table.tail(2)[0].date.day0(), 1);
        assert_eq!(table.tail(10).len(), 3);
        assert!(FeatureTable::default().tail(2).is_empty());
    }

    #[test]
    fn column_names_follow_report_headers() {
        let names: Vec<&str> = FeatureColumn::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            ["Open", "High", "Low", "Volume", "Price_Change", "SMA_5", "SMA_10"]
        );
    }

    #[test]
    fn same_day_policy_parses_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: SameDayPolicy,
        }
        let w: Wrapper = serde_json::from_str(r#"{"policy":"lagged"}"#).unwrap();
        assert_eq!(w.policy, SameDayPolicy::Lagged);
    }
}
