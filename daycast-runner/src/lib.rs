//! Daycast Runner — turns a symbol into a prediction response.
//!
//! This crate builds on `daycast-core` to provide:
//! - The split & validation controller (train/test/validate partitioning)
//! - Request parsing and the JSON response model
//! - Run orchestration with stage-local error capture
//! - Persistence sinks (Google Sheets, CSV, Parquet)
//! - TOML configuration

pub mod config;
pub mod evaluate;
pub mod request;
pub mod response;
pub mod runner;
pub mod sink;

pub use config::{ConfigError, DaycastConfig, ProviderKind, SinkKind};
pub use evaluate::{
    evaluate, evaluate_with, split_rows, EvaluateConfig, PredictionError, PredictionResult, Split,
};
pub use request::PredictionRequest;
pub use response::{LastDayRow, PredictionResponse, Status, StockTable};
pub use runner::{RunError, Runner};
pub use sink::{
    sheet_rows, CsvSink, GoogleSheetsSink, ParquetSink, PersistenceError, SheetsConfig,
    SinkTarget, TableSink,
};
