//! Yahoo Finance data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API, one request per call.
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; a malformed payload surfaces as `ResponseFormatChanged`, which the
//! retry loop treats as transient.

use super::provider::{DataError, DataProvider, DataSource, FetchResult, HistoryWindow};
use crate::domain::Bar;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://query2.finance.yahoo.com";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartSeries>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartSeries {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Point the provider at another host (a mirror or a local stub).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, window: HistoryWindow) -> String {
        let start_ts = window.start.and_time(chrono::NaiveTime::MIN).and_utc().timestamp();
        let end_ts = window
            .end
            .and_time(chrono::NaiveTime::MIN)
            .and_utc()
            .timestamp()
            + 86_399;
        format!(
            "{}/v8/finance/chart/{symbol}?period1={start_ts}&period2={end_ts}&interval=1d",
            self.base_url
        )
    }
}

/// Convert a chart payload into bars, skipping days with no quote at all.
fn bars_from_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
    let series = match (resp.chart.result, resp.chart.error) {
        (Some(result), _) => result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?,
        (None, Some(err)) if err.code == "Not Found" => {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })
        }
        (None, Some(err)) => {
            return Err(DataError::ResponseFormatChanged(format!(
                "{}: {}",
                err.code, err.description
            )))
        }
        (None, None) => {
            return Err(DataError::ResponseFormatChanged("empty result with no error".into()))
        }
    };

    let Some(timestamps) = series.timestamp else {
        // A valid symbol with no trading days in range.
        return Ok(Vec::new());
    };
    let quote = series
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

    let at = |column: &[Option<f64>], i: usize| column.get(i).copied().flatten();
    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.date_naive())
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let (open, high, low, close) = (
            at(&quote.open, i),
            at(&quote.high, i),
            at(&quote.low, i),
            at(&quote.close, i),
        );
        let volume = quote.volume.get(i).copied().flatten();
        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none() {
            continue;
        }

        bars.push(Bar {
            date,
            open: open.unwrap_or(f64::NAN),
            high: high.unwrap_or(f64::NAN),
            low: low.unwrap_or(f64::NAN),
            close: close.unwrap_or(f64::NAN),
            volume: volume.unwrap_or(0),
        });
    }

    Ok(bars)
}

impl DataProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch_once(&self, symbol: &str, window: HistoryWindow) -> Result<FetchResult, DataError> {
        let url = self.chart_url(symbol, window);
        tracing::debug!(%url, "requesting chart");

        let resp = self.client.get(&url).send().map_err(|e| {
            if e.is_timeout() || e.is_connect() {
                DataError::NetworkUnreachable(e.to_string())
            } else {
                DataError::Other(e.to_string())
            }
        })?;

        let status = resp.status();
        match status {
            reqwest::StatusCode::FORBIDDEN => return Err(DataError::Blocked),
            reqwest::StatusCode::UNAUTHORIZED => {
                return Err(DataError::AuthenticationRequired(
                    "Yahoo Finance requires authentication".into(),
                ))
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                })
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                let retry_after_secs = resp
                    .headers()
                    .get(reqwest::header::RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                return Err(DataError::RateLimited { retry_after_secs });
            }
            s if !s.is_success() => {
                return Err(DataError::Other(format!("HTTP {s} for {symbol}")));
            }
            _ => {}
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
        })?;

        Ok(FetchResult {
            symbol: symbol.to_string(),
            bars: bars_from_chart(symbol, chart)?,
            source: DataSource::YahooFinance,
        })
    }
}
