//! End-to-end runner scenarios with scripted providers and sinks.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use daycast_core::data::{
    DataError, DataProvider, DataSource, FetchResult, HistoryWindow, RetryPolicy,
    SyntheticPattern, SyntheticProvider,
};
use daycast_core::data::synthetic::{random_walk_bars, trading_days};
use daycast_core::domain::{Bar, ValidationOutcome};
use daycast_core::features::engineer;
use daycast_core::ml::ForestParams;
use daycast_runner::{
    evaluate, CsvSink, EvaluateConfig, PersistenceError, PredictionRequest, Runner, SinkTarget,
    Status, TableSink,
};

fn window() -> HistoryWindow {
    HistoryWindow::new(
        NaiveDate::from_ymd_opt(2022, 1, 3).unwrap(),
        NaiveDate::from_ymd_opt(2023, 12, 29).unwrap(),
    )
}

fn bars(n: usize) -> Vec<Bar> {
    let base = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + ((i * 7) % 5) as f64;
            Bar {
                date: base + chrono::Duration::days(i as i64),
                open: close - 0.5,
                high: close + 1.0,
                low: close - 1.0,
                close,
                volume: 1_000 + i as u64,
            }
        })
        .collect()
}

/// Returns the same outcome on every attempt and counts attempts.
struct Fixed {
    outcome: fn() -> Result<Vec<Bar>, DataError>,
    attempts: Arc<AtomicUsize>,
}

impl DataProvider for Fixed {
    fn name(&self) -> &str {
        "fixed"
    }

    fn fetch_once(&self, symbol: &str, _window: HistoryWindow) -> Result<FetchResult, DataError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        (self.outcome)().map(|bars| FetchResult {
            symbol: symbol.to_string(),
            bars,
            source: DataSource::Synthetic,
        })
    }
}

fn runner(outcome: fn() -> Result<Vec<Bar>, DataError>) -> (Runner, Arc<AtomicUsize>) {
    let attempts = Arc::new(AtomicUsize::new(0));
    let provider = Fixed {
        outcome,
        attempts: Arc::clone(&attempts),
    };
    let runner = Runner::new(Box::new(provider))
        .with_retry(RetryPolicy::immediate(3))
        .with_window(window());
    (runner, attempts)
}

struct FailingSink;

impl TableSink for FailingSink {
    fn name(&self) -> &str {
        "failing"
    }

    fn write(&self, _bars: &[Bar], _target: &SinkTarget) -> Result<usize, PersistenceError> {
        Err(PersistenceError::Api {
            status: 403,
            message: "permission denied".into(),
        })
    }
}

fn request(symbol: &str) -> PredictionRequest {
    PredictionRequest::new(symbol).unwrap()
}

#[test]
fn no_data_after_three_attempts_is_an_error_response() {
    let (runner, attempts) = runner(|| Ok(Vec::new()));
    let response = runner.run(&request("TEST"));

    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.message, "Could not retrieve data for TEST.");
    assert!(response.stock_data.is_none());

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("stock_data").is_none());
}

#[test]
fn unknown_symbol_is_not_retried() {
    let (runner, attempts) = runner(|| {
        Err(DataError::SymbolNotFound {
            symbol: "NOPE".into(),
        })
    });
    let response = runner.run(&request("NOPE"));
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(response.status, Status::Error);
}

#[test]
fn twenty_nine_feature_rows_reports_prediction_error() {
    let (runner, _) = runner(|| Ok(bars(39)));
    let response = runner.run(&request("TEST"));

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.stock_data.as_ref().map(|t| t.len()), Some(39));
    assert!(response.prediction_for_last_day.is_none());
    assert!(response.accuracy.is_none());
    let err = response.prediction_error.as_deref().unwrap();
    assert!(err.starts_with("Could not generate prediction: Not enough data"), "{err}");

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("prediction_for_last_day").is_none());
}

#[test]
fn thirty_feature_rows_predicts() {
    let (runner, _) = runner(|| Ok(bars(40)));
    let response = runner.run(&request("TEST"));

    assert!(response.prediction_error.is_none());
    assert!(response.prediction_for_last_day.is_some());
    let tail = response.last_day_data.as_ref().unwrap();
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[1].date, "2024-02-09");
}

#[test]
fn persistence_failure_does_not_affect_prediction() {
    let (runner, _) = runner(|| Ok(bars(120)));
    let runner = runner.with_sink(Box::new(FailingSink), "sheet-id");
    let response = runner.run(&request("TEST"));

    assert_eq!(response.status, Status::Success);
    assert!(response.prediction_for_last_day.is_some());
    assert!(response.prediction_error.is_none());
    let status = response.persistence_status.as_deref().unwrap();
    assert!(status.starts_with("Failed to write to failing:"), "{status}");
}

#[test]
fn csv_sink_writes_tab_named_after_symbol() {
    let dir = tempfile::tempdir().unwrap();
    let (runner, _) = runner(|| Ok(bars(50)));
    let runner = runner.with_sink(Box::new(CsvSink::new()), dir.path().to_string_lossy());
    let response = runner.run(&request("AAPL"));

    assert_eq!(
        response.persistence_status.as_deref(),
        Some("Successfully wrote 50 rows to csv 'AAPL'.")
    );
    let text = std::fs::read_to_string(dir.path().join("AAPL.csv")).unwrap();
    assert_eq!(text.lines().count(), 51);
}

#[test]
fn alternating_end_to_end() {
    let provider = SyntheticProvider::new(SyntheticPattern::Alternating {
        low: 100.0,
        high: 101.0,
    });
    let runner = Runner::new(Box::new(provider))
        .with_retry(RetryPolicy::immediate(3))
        .with_window(window());
    let response = runner.run_raw(r#"'{"stock_symbol": "TEST"}'"#);

    assert_eq!(response.status, Status::Success);
    assert_eq!(response.message, "Successfully fetched data for TEST");
    assert!(response.accuracy.unwrap() >= 0.9);
    assert_eq!(response.validation_result, Some(ValidationOutcome::Correct));
    assert_eq!(response.dataset_hash.as_ref().map(String::len), Some(64));
}

#[test]
fn same_input_same_response() {
    let (a, _) = runner(|| Ok(bars(200)));
    let (b, _) = runner(|| Ok(bars(200)));
    assert_eq!(a.run(&request("TEST")), b.run(&request("TEST")));
}

fn walk() -> Result<Vec<Bar>, DataError> {
    let w = window();
    Ok(random_walk_bars(&trading_days(w.start, w.end), "TEST", 42, 100.0))
}

#[test]
fn runner_and_evaluate_share_one_seed() {
    let table = engineer(&walk().unwrap());
    for seed in [0, 7, 1234] {
        let config = EvaluateConfig {
            seed,
            ..EvaluateConfig::default()
        };
        let expected = evaluate(&table, &config).unwrap();

        // A forest seed left at its default must not override the run seed.
        let (runner, _) = runner(walk);
        let runner = runner
            .with_forest(ForestParams::default())
            .with_evaluate_config(config);
        let response = runner.run(&request("TEST"));

        assert_eq!(response.accuracy, Some(expected.test_accuracy), "seed {seed}");
        assert_eq!(
            response.prediction_for_last_day,
            Some(expected.predicted_direction),
            "seed {seed}"
        );
    }
}

#[test]
fn empty_symbol_is_rejected_before_fetching() {
    let (runner, attempts) = runner(|| Ok(bars(50)));
    let response = runner.run_raw(r#"{"stock_symbol": ""}"#);
    assert_eq!(response.status, Status::Error);
    assert_eq!(response.message, "Stock symbol not provided.");
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}

#[test]
fn runner_from_config_wires_provider_and_sink() {
    let dir = tempfile::tempdir().unwrap();
    let toml = format!(
        r#"
        [source]
        provider = "synthetic"
        backoff_ms = 0

        [sink]
        kind = "parquet"
        destination = "{}"
        "#,
        dir.path().display().to_string().replace('\\', "/")
    );
    let config = daycast_runner::DaycastConfig::from_toml(&toml).unwrap();
    let runner = Runner::from_config(&config).unwrap().with_window(window());
    let response = runner.run(&request("SPY"));

    assert_eq!(response.status, Status::Success);
    assert!(response.prediction_for_last_day.is_some());
    assert!(dir.path().join("SPY.parquet").exists());
    assert!(response
        .persistence_status
        .as_deref()
        .unwrap()
        .starts_with("Successfully wrote"));
}
