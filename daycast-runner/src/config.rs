//! Run configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) gives the
//! reference behaviour: Yahoo Finance, two years of history, three attempts
//! one second apart, seed 42, an 80/20 split, 100 trees and no persistence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use daycast_core::data::{
    CsvProvider, DataProvider, RetryPolicy, SyntheticPattern, SyntheticProvider, YahooProvider,
};
use daycast_core::features::SameDayPolicy;
use daycast_core::ml::ForestParams;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::evaluate::EvaluateConfig;

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {message}")]
    Io { path: PathBuf, message: String },
    #[error("parse config TOML: {0}")]
    Parse(String),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("provider setup failed: {0}")]
    Provider(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkKind {
    #[default]
    None,
    Csv,
    Parquet,
    GoogleSheets,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub provider: ProviderKind,
    pub history_years: u32,
    pub max_attempts: u32,
    pub backoff_ms: u64,
    /// Directory of `{SYMBOL}.csv` files for the `csv` provider.
    pub csv_dir: Option<PathBuf>,
    pub synthetic: SyntheticPattern,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Yahoo,
            history_years: 2,
            max_attempts: 3,
            backoff_ms: 1000,
            csv_dir: None,
            synthetic: SyntheticPattern::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub seed: u64,
    pub test_fraction: f64,
    pub min_rows: usize,
    pub n_trees: usize,
    pub min_samples_split: usize,
    pub same_day_columns: SameDayPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            test_fraction: 0.2,
            min_rows: 30,
            n_trees: 100,
            min_samples_split: 10,
            same_day_columns: SameDayPolicy::Current,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SinkConfig {
    pub kind: SinkKind,
    /// Spreadsheet id for `google_sheets`, output directory for file sinks.
    pub destination: Option<String>,
    /// Environment variable holding the Sheets OAuth bearer token.
    pub access_token_env: String,
    pub api_base: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            kind: SinkKind::None,
            destination: None,
            access_token_env: "GOOGLE_SHEETS_ACCESS_TOKEN".into(),
            api_base: "https://sheets.googleapis.com/v4".into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DaycastConfig {
    pub source: SourceConfig,
    pub pipeline: PipelineConfig,
    pub sink: SinkConfig,
}

impl DaycastConfig {
    /// Load and validate a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.source.history_years == 0 {
            return invalid("source.history_years must be at least 1".into());
        }
        if self.source.max_attempts == 0 {
            return invalid("source.max_attempts must be at least 1".into());
        }
        if self.source.provider == ProviderKind::Csv && self.source.csv_dir.is_none() {
            return invalid("source.csv_dir is required for the csv provider".into());
        }
        let p = &self.pipeline;
        if !(p.test_fraction > 0.0 && p.test_fraction < 1.0) {
            return invalid(format!(
                "pipeline.test_fraction must be in (0, 1), got {}",
                p.test_fraction
            ));
        }
        // One validate row plus at least one train and one test row.
        if p.min_rows < 3 {
            return invalid(format!("pipeline.min_rows must be at least 3, got {}", p.min_rows));
        }
        if p.n_trees == 0 {
            return invalid("pipeline.n_trees must be at least 1".into());
        }
        if p.min_samples_split < 2 {
            return invalid(format!(
                "pipeline.min_samples_split must be at least 2, got {}",
                p.min_samples_split
            ));
        }
        if self.sink.kind != SinkKind::None
            && self.sink.destination.as_deref().map_or(true, str::is_empty)
        {
            return invalid("sink.destination is required when a sink is configured".into());
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.source.max_attempts,
            backoff: Duration::from_millis(self.source.backoff_ms),
        }
    }

    pub fn evaluate_config(&self) -> EvaluateConfig {
        EvaluateConfig {
            seed: self.pipeline.seed,
            test_fraction: self.pipeline.test_fraction,
            min_rows: self.pipeline.min_rows,
        }
    }

    pub fn forest_params(&self) -> ForestParams {
        ForestParams {
            n_trees: self.pipeline.n_trees,
            min_samples_split: self.pipeline.min_samples_split,
            seed: self.pipeline.seed,
            ..ForestParams::default()
        }
    }
}

/// Construct the configured price-history source.
pub fn build_provider(config: &DaycastConfig) -> Result<Box<dyn DataProvider>, ConfigError> {
    Ok(match config.source.provider {
        ProviderKind::Yahoo => {
            Box::new(YahooProvider::new().map_err(|e| ConfigError::Provider(e.to_string()))?)
        }
        ProviderKind::Csv => {
            let dir = config.source.csv_dir.clone().ok_or_else(|| {
                ConfigError::Invalid("source.csv_dir is required for the csv provider".into())
            })?;
            Box::new(CsvProvider::new(dir))
        }
        ProviderKind::Synthetic => Box::new(SyntheticProvider::new(config.source.synthetic)),
    })
}
