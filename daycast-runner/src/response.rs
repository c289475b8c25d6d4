//! Structured run response, serialized to JSON on stdout.
//!
//! The raw bar series is always present on success. Prediction fields and
//! `prediction_error` are mutually exclusive, and `persistence_status`
//! reports the sink outcome independently of both.

use std::collections::BTreeMap;

use daycast_core::domain::{Bar, Direction, ValidationOutcome};
use daycast_core::features::FeatureRow;
use serde::{Deserialize, Serialize};

use crate::evaluate::{PredictionError, PredictionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Raw bars as a column-oriented table keyed by ISO datetime.
///
/// `{"Open": {"2024-01-02T00:00:00.000Z": 187.15, ...}, "High": {...}, ...}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockTable {
    #[serde(rename = "Open")]
    pub open: BTreeMap<String, f64>,
    #[serde(rename = "High")]
    pub high: BTreeMap<String, f64>,
    #[serde(rename = "Low")]
    pub low: BTreeMap<String, f64>,
    #[serde(rename = "Close")]
    pub close: BTreeMap<String, f64>,
    #[serde(rename = "Volume")]
    pub volume: BTreeMap<String, u64>,
}

impl StockTable {
    pub fn from_bars(bars: &[Bar]) -> Self {
        let mut table = Self::default();
        for bar in bars {
            let key = bar.date.format("%Y-%m-%dT00:00:00.000Z").to_string();
            table.open.insert(key.clone(), bar.open);
            table.high.insert(key.clone(), bar.high);
            table.low.insert(key.clone(), bar.low);
            table.close.insert(key.clone(), bar.close);
            table.volume.insert(key, bar.volume);
        }
        table
    }

    pub fn len(&self) -> usize {
        self.close.len()
    }

    pub fn is_empty(&self) -> bool {
        self.close.is_empty()
    }
}

/// One engineered row as reported in `last_day_data`, rounded to cents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastDayRow {
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Open")]
    pub open: f64,
    #[serde(rename = "High")]
    pub high: f64,
    #[serde(rename = "Low")]
    pub low: f64,
    #[serde(rename = "Close")]
    pub close: f64,
    #[serde(rename = "Volume")]
    pub volume: f64,
    #[serde(rename = "Price_Change")]
    pub price_change: f64,
    #[serde(rename = "SMA_5")]
    pub sma_5: f64,
    #[serde(rename = "SMA_10")]
    pub sma_10: f64,
    #[serde(rename = "Target")]
    pub target: u8,
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

impl From<&FeatureRow> for LastDayRow {
    fn from(row: &FeatureRow) -> Self {
        Self {
            date: row.date.format("%Y-%m-%d").to_string(),
            open: round2(row.open),
            high: round2(row.high),
            low: round2(row.low),
            close: round2(row.close),
            volume: round2(row.volume),
            price_change: round2(row.price_change),
            sma_5: round2(row.sma_5),
            sma_10: round2(row.sma_10),
            target: row.target,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResponse {
    pub status: Status,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock_data: Option<StockTable>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dataset_hash: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_for_last_day: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_result: Option<ValidationOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actual_result_for_last_day: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_day_data: Option<Vec<LastDayRow>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prediction_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistence_status: Option<String>,
}

impl PredictionResponse {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: message.into(),
            stock_data: None,
            dataset_hash: None,
            prediction_for_last_day: None,
            validation_result: None,
            actual_result_for_last_day: None,
            accuracy: None,
            last_day_data: None,
            prediction_error: None,
            persistence_status: None,
        }
    }

    pub fn success(symbol: &str, bars: &[Bar], dataset_hash: String) -> Self {
        Self {
            status: Status::Success,
            message: format!("Successfully fetched data for {symbol}"),
            stock_data: Some(StockTable::from_bars(bars)),
            dataset_hash: Some(dataset_hash),
            ..Self::error(String::new())
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == Status::Success
    }

    /// Record a prediction and the last two engineered rows.
    pub fn set_prediction(&mut self, result: &PredictionResult, tail: &[FeatureRow]) {
        self.prediction_for_last_day = Some(result.predicted_direction);
        self.validation_result = Some(result.validation_outcome);
        self.actual_result_for_last_day = Some(result.actual_direction);
        self.accuracy = Some(result.test_accuracy);
        self.last_day_data = Some(tail.iter().map(LastDayRow::from).collect());
    }

    pub fn set_prediction_error(&mut self, err: &PredictionError) {
        self.prediction_error = Some(format!("Could not generate prediction: {err}"));
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 500,
        }
    }

    #[test]
    fn error_response_has_only_status_and_message() {
        let json = serde_json::to_value(PredictionResponse::error("Could not retrieve data for X.")).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(obj["status"], "error");
        assert_eq!(obj["message"], "Could not retrieve data for X.");
    }

    #[test]
    fn stock_data_is_column_oriented() {
        let resp = PredictionResponse::success("SPY", &[bar(4, 10.0), bar(5, 11.0)], "h".into());
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["message"], "Successfully fetched data for SPY");
        assert_eq!(json["stock_data"]["Close"]["2024-03-05T00:00:00.000Z"], 11.0);
        assert_eq!(json["stock_data"]["Volume"]["2024-03-04T00:00:00.000Z"], 500);
        assert!(json.get("prediction_for_last_day").is_none());
    }

    #[test]
    fn last_day_rows_are_rounded() {
        let row = FeatureRow {
            date: NaiveDate::from_ymd_opt(2024, 3, 5).unwrap(),
            open: 1.234,
            high: 2.345,
            low: 0.999,
            close: 2.0,
            volume: 1000.0,
            price_change: -0.126,
            sma_5: 1.005_1,
            sma_10: 1.0,
            target: 1,
        };
        let out = LastDayRow::from(&row);
        assert_eq!(out.date, "2024-03-05");
        assert_eq!(out.open, 1.23);
        assert_eq!(out.low, 1.0);
        assert_eq!(out.price_change, -0.13);
        assert_eq!(out.sma_5, 1.01);
    }

    #[test]
    fn directions_serialize_as_words() {
        let mut resp = PredictionResponse::success("SPY", &[bar(4, 10.0)], "h".into());
        let result = PredictionResult {
            predicted_direction: Direction::Up,
            validation_outcome: ValidationOutcome::Incorrect,
            actual_direction: Direction::Down,
            test_accuracy: 0.5,
            train_rows: 8,
            test_rows: 2,
        };
        resp.set_prediction(&result, &[]);
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["prediction_for_last_day"], "Up");
        assert_eq!(json["validation_result"], "Incorrect");
        assert_eq!(json["actual_result_for_last_day"], "Down");
        assert_eq!(json["accuracy"], 0.5);
    }
}
