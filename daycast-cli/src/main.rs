//! Daycast CLI — next-day direction prediction for a stock symbol.
//!
//! Commands:
//! - `predict` — fetch history, train, predict, and print the JSON response
//! - `features` — print the engineered feature table for a symbol as JSON
//! - `config` — print the effective configuration as TOML
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries only the
//! JSON or TOML output.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use daycast_core::data::{fetch_history, HistoryWindow};
use daycast_core::features::{engineer_with, SameDayPolicy};
use daycast_runner::{DaycastConfig, PredictionRequest, ProviderKind, Runner, SinkKind};

#[derive(Parser)]
#[command(
    name = "daycast",
    about = "Daycast CLI — next-day price direction from daily bars"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Predict tomorrow's direction for a symbol and print the JSON response.
    Predict {
        /// JSON payload, e.g. '{"stock_symbol": "AAPL"}'.
        payload: Option<String>,

        /// Symbol (alternative to the JSON payload).
        #[arg(long, conflicts_with = "payload")]
        symbol: Option<String>,

        #[command(flatten)]
        opts: CommonOpts,

        /// Persistence sink.
        #[arg(long, value_enum)]
        sink: Option<SinkArg>,

        /// Spreadsheet id (google-sheets) or output directory (csv, parquet).
        #[arg(long)]
        destination: Option<String>,
    },
    /// Print the engineered feature table for a symbol as JSON.
    Features {
        #[arg(long)]
        symbol: String,

        #[command(flatten)]
        opts: CommonOpts,
    },
    /// Print the effective configuration (file plus flags) as TOML.
    Config {
        #[command(flatten)]
        opts: CommonOpts,
    },
}

#[derive(Args)]
struct CommonOpts {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Price-history source.
    #[arg(long, value_enum)]
    provider: Option<ProviderArg>,

    /// Directory of {SYMBOL}.csv files (implies --provider csv).
    #[arg(long)]
    csv_dir: Option<PathBuf>,

    /// Use deterministic synthetic bars (implies --provider synthetic).
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Random seed for the split and the forest.
    #[arg(long)]
    seed: Option<u64>,

    /// Lag same-day open/high/low/volume by one bar.
    #[arg(long, default_value_t = false)]
    lag_same_day: bool,

    /// Start date (YYYY-MM-DD). Defaults to `history_years` before --end.
    #[arg(long)]
    start: Option<String>,

    /// End date (YYYY-MM-DD). Defaults to today.
    #[arg(long)]
    end: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ProviderArg {
    Yahoo,
    Csv,
    Synthetic,
}

#[derive(Clone, Copy, ValueEnum)]
enum SinkArg {
    None,
    Csv,
    Parquet,
    GoogleSheets,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Predict {
            payload,
            symbol,
            opts,
            sink,
            destination,
        } => run_predict(payload, symbol, &opts, sink, destination),
        Commands::Features { symbol, opts } => run_features(&symbol, &opts),
        Commands::Config { opts } => {
            let config = load_config(&opts)?;
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

/// Config file (or defaults) with command-line overrides applied.
fn load_config(opts: &CommonOpts) -> Result<DaycastConfig> {
    let mut config = match &opts.config {
        Some(path) => DaycastConfig::from_file(path)?,
        None => DaycastConfig::default(),
    };

    if let Some(provider) = opts.provider {
        config.source.provider = match provider {
            ProviderArg::Yahoo => ProviderKind::Yahoo,
            ProviderArg::Csv => ProviderKind::Csv,
            ProviderArg::Synthetic => ProviderKind::Synthetic,
        };
    }
    if let Some(dir) = &opts.csv_dir {
        config.source.csv_dir = Some(dir.clone());
        if opts.provider.is_none() {
            config.source.provider = ProviderKind::Csv;
        }
    }
    if opts.synthetic {
        config.source.provider = ProviderKind::Synthetic;
    }
    if let Some(seed) = opts.seed {
        config.pipeline.seed = seed;
    }
    if opts.lag_same_day {
        config.pipeline.same_day_columns = SameDayPolicy::Lagged;
    }

    config.validate()?;
    Ok(config)
}

fn history_window(opts: &CommonOpts, config: &DaycastConfig) -> Result<Option<HistoryWindow>> {
    if opts.start.is_none() && opts.end.is_none() {
        return Ok(None);
    }
    let end = match &opts.end {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let window = match &opts.start {
        Some(s) => HistoryWindow::new(parse_date(s)?, end),
        None => HistoryWindow::trailing_years(end, config.source.history_years),
    };
    if window.start > window.end {
        bail!("--start must not be after --end");
    }
    Ok(Some(window))
}

fn build_runner(opts: &CommonOpts, config: &DaycastConfig) -> Result<Runner> {
    let mut runner = Runner::from_config(config)?;
    if let Some(window) = history_window(opts, config)? {
        runner = runner.with_window(window);
    }
    Ok(runner)
}

fn run_predict(
    payload: Option<String>,
    symbol: Option<String>,
    opts: &CommonOpts,
    sink: Option<SinkArg>,
    destination: Option<String>,
) -> Result<()> {
    let mut config = load_config(opts)?;
    if let Some(sink) = sink {
        config.sink.kind = match sink {
            SinkArg::None => SinkKind::None,
            SinkArg::Csv => SinkKind::Csv,
            SinkArg::Parquet => SinkKind::Parquet,
            SinkArg::GoogleSheets => SinkKind::GoogleSheets,
        };
    }
    if destination.is_some() {
        config.sink.destination = destination;
    }
    config.validate()?;

    let runner = build_runner(opts, &config)?;
    let response = match (payload, symbol) {
        (Some(raw), _) => runner.run_raw(&raw),
        (None, Some(symbol)) => match PredictionRequest::new(symbol) {
            Ok(request) => runner.run(&request),
            Err(e) => daycast_runner::PredictionResponse::error(e.to_string()),
        },
        (None, None) => bail!("provide a JSON payload or --symbol"),
    };

    println!("{}", response.to_json_pretty()?);

    if !response.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

fn run_features(symbol: &str, opts: &CommonOpts) -> Result<()> {
    let config = load_config(opts)?;
    let request = PredictionRequest::new(symbol)?;
    let window = history_window(opts, &config)?.unwrap_or_else(|| {
        HistoryWindow::trailing_years(chrono::Local::now().date_naive(), config.source.history_years)
    });

    let provider = daycast_runner::config::build_provider(&config)?;
    let bars = fetch_history(provider.as_ref(), &request.symbol, window, &config.retry_policy())
        .with_context(|| format!("Could not retrieve data for {}.", request.symbol))?;
    let table = engineer_with(&bars, config.pipeline.same_day_columns);

    tracing::info!(bars = bars.len(), rows = table.len(), "engineered features");
    println!("{}", serde_json::to_string_pretty(table.rows())?);
    Ok(())
}
