//! Run orchestration: request → fetch → features → evaluate → persist → response.
//!
//! Only input validation and data retrieval are fatal. Prediction and
//! persistence failures are captured in the response so the caller always
//! receives the raw series once it was fetched.

use daycast_core::data::{fetch_history, DataProvider, HistoryWindow, RetryPolicy};
use daycast_core::domain::Bar;
use daycast_core::features::{engineer_with, FeatureTable, SameDayPolicy};
use daycast_core::fingerprint::dataset_hash;
use daycast_core::ml::{ForestParams, RandomForestClassifier};
use thiserror::Error;

use crate::config::{build_provider, ConfigError, DaycastConfig, SinkKind};
use crate::evaluate::{evaluate_with, EvaluateConfig, PredictionError, PredictionResult};
use crate::request::PredictionRequest;
use crate::response::PredictionResponse;
use crate::sink::{CsvSink, GoogleSheetsSink, ParquetSink, SheetsConfig, SinkTarget, TableSink};

/// Errors that end a run with `status = "error"`.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    Input(String),
    #[error("Could not retrieve data for {symbol}.")]
    DataUnavailable { symbol: String, reason: String },
}

pub struct Runner {
    provider: Box<dyn DataProvider>,
    retry: RetryPolicy,
    history_years: u32,
    window: Option<HistoryWindow>,
    evaluate: EvaluateConfig,
    forest: ForestParams,
    same_day: SameDayPolicy,
    sink: Option<(Box<dyn TableSink>, String)>,
}

impl Runner {
    pub fn new(provider: Box<dyn DataProvider>) -> Self {
        Self {
            provider,
            retry: RetryPolicy::default(),
            history_years: 2,
            window: None,
            evaluate: EvaluateConfig::default(),
            forest: ForestParams::default(),
            same_day: SameDayPolicy::Current,
            sink: None,
        }
    }

    /// Build a runner, provider and sink from a validated config.
    pub fn from_config(config: &DaycastConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let provider = build_provider(config)?;

        let mut runner = Self::new(provider)
            .with_retry(config.retry_policy())
            .with_history_years(config.source.history_years)
            .with_evaluate_config(config.evaluate_config())
            .with_forest(config.forest_params())
            .with_same_day_policy(config.pipeline.same_day_columns);

        let destination = config.sink.destination.clone().unwrap_or_default();
        let sink: Option<Box<dyn TableSink>> = match config.sink.kind {
            SinkKind::None => None,
            SinkKind::Csv => Some(Box::new(CsvSink::new())),
            SinkKind::Parquet => Some(Box::new(ParquetSink::new())),
            SinkKind::GoogleSheets => Some(Box::new(
                GoogleSheetsSink::new(SheetsConfig {
                    api_base: config.sink.api_base.clone(),
                    access_token_env: config.sink.access_token_env.clone(),
                })
                .map_err(|e| ConfigError::Invalid(e.to_string()))?,
            )),
        };
        if let Some(sink) = sink {
            runner = runner.with_sink(sink, destination);
        }
        Ok(runner)
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_history_years(mut self, years: u32) -> Self {
        self.history_years = years;
        self
    }

    /// Pin the history window instead of trailing from today.
    pub fn with_window(mut self, window: HistoryWindow) -> Self {
        self.window = Some(window);
        self
    }

    /// The config's seed drives both the split and the forest.
    pub fn with_evaluate_config(mut self, config: EvaluateConfig) -> Self {
        self.evaluate = config;
        self
    }

    /// Forest shape. `params.seed` is ignored; see `with_evaluate_config`.
    pub fn with_forest(mut self, params: ForestParams) -> Self {
        self.forest = params;
        self
    }

    pub fn with_same_day_policy(mut self, policy: SameDayPolicy) -> Self {
        self.same_day = policy;
        self
    }

    pub fn with_sink(mut self, sink: Box<dyn TableSink>, destination: impl Into<String>) -> Self {
        self.sink = Some((sink, destination.into()));
        self
    }

    fn window(&self) -> HistoryWindow {
        self.window.unwrap_or_else(|| {
            HistoryWindow::trailing_years(chrono::Local::now().date_naive(), self.history_years)
        })
    }

    /// Parse a raw JSON invocation and run it.
    pub fn run_raw(&self, raw: &str) -> PredictionResponse {
        match PredictionRequest::parse(raw) {
            Ok(request) => self.run(&request),
            Err(e) => {
                tracing::error!(error = %e, "rejected request");
                PredictionResponse::error(e.to_string())
            }
        }
    }

    pub fn run(&self, request: &PredictionRequest) -> PredictionResponse {
        match self.try_run(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(symbol = %request.symbol, error = ?e, "run failed");
                PredictionResponse::error(e.to_string())
            }
        }
    }

    fn try_run(&self, request: &PredictionRequest) -> Result<PredictionResponse, RunError> {
        let symbol = request.symbol.as_str();
        let bars = self.fetch(symbol)?;
        let mut response = PredictionResponse::success(symbol, &bars, dataset_hash(&bars));

        let table = engineer_with(&bars, self.same_day);
        match self.predict(&table) {
            Ok(result) => response.set_prediction(&result, table.tail(2)),
            Err(e) => {
                tracing::warn!(symbol, error = %e, "prediction stage failed");
                response.set_prediction_error(&e);
            }
        }

        if let Some((sink, destination)) = &self.sink {
            response.persistence_status = Some(persist(sink.as_ref(), &bars, destination, symbol));
        }

        Ok(response)
    }

    fn fetch(&self, symbol: &str) -> Result<Vec<Bar>, RunError> {
        let window = self.window();
        tracing::info!(
            symbol,
            provider = self.provider.name(),
            start = %window.start,
            end = %window.end,
            "fetching history"
        );
        fetch_history(self.provider.as_ref(), symbol, window, &self.retry).map_err(|e| {
            RunError::DataUnavailable {
                symbol: symbol.to_string(),
                reason: e.to_string(),
            }
        })
    }

    fn predict(&self, table: &FeatureTable) -> Result<PredictionResult, PredictionError> {
        let mut forest = RandomForestClassifier::new(ForestParams {
            seed: self.evaluate.seed,
            ..self.forest
        });
        evaluate_with(table, &mut forest, &self.evaluate)
    }
}

fn persist(sink: &dyn TableSink, bars: &[Bar], destination: &str, symbol: &str) -> String {
    let target = SinkTarget::new(destination, symbol);
    match sink.write(bars, &target) {
        Ok(rows) => format!(
            "Successfully wrote {rows} rows to {} '{}'.",
            sink.name(),
            target.tab
        ),
        Err(e) => {
            tracing::warn!(sink = sink.name(), error = %e, "persistence stage failed");
            format!("Failed to write to {}: {e}", sink.name())
        }
    }
}
