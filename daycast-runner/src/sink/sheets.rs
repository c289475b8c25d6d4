//! Google Sheets sink over the Sheets v4 REST API.
//!
//! The target destination is the spreadsheet id and the tab is the worksheet
//! title. A write ensures the worksheet exists (adding it when missing),
//! clears it, then appends the header and all rows with `USER_ENTERED`
//! value input.
//!
//! Credentials are an OAuth bearer token read from the environment variable
//! named in `SheetsConfig`. Nothing is read from fixed filesystem paths.

use std::time::Duration;

use daycast_core::domain::Bar;
use reqwest::blocking::{Client, RequestBuilder};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use super::{sheet_rows, PersistenceError, SinkTarget, TableSink};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetsConfig {
    pub api_base: String,
    pub access_token_env: String,
}

impl Default for SheetsConfig {
    fn default() -> Self {
        Self {
            api_base: "https://sheets.googleapis.com/v4".into(),
            access_token_env: "GOOGLE_SHEETS_ACCESS_TOKEN".into(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
}

pub struct GoogleSheetsSink {
    config: SheetsConfig,
    client: Client,
}

impl GoogleSheetsSink {
    pub fn new(config: SheetsConfig) -> Result<Self, PersistenceError> {
        let mut builder = Client::builder().timeout(Duration::from_secs(30));
        // Local emulators are reached directly, never through a system proxy.
        if is_loopback(&config.api_base) {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| PersistenceError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    fn token(&self) -> Result<String, PersistenceError> {
        match std::env::var(&self.config.access_token_env) {
            Ok(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            _ => Err(PersistenceError::Credentials(format!(
                "environment variable {} is not set",
                self.config.access_token_env
            ))),
        }
    }

    /// `{api_base}/spreadsheets/{id}/{segments...}`, each segment percent-encoded.
    fn url(&self, spreadsheet_id: &str, segments: &[&str]) -> Result<Url, PersistenceError> {
        let mut url = Url::parse(self.config.api_base.trim_end_matches('/'))
            .map_err(|e| PersistenceError::Http(format!("bad api_base: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| PersistenceError::Http("api_base cannot carry a path".into()))?
            .pop_if_empty()
            .push("spreadsheets")
            .push(spreadsheet_id)
            .extend(segments);
        Ok(url)
    }

    fn send(&self, request: RequestBuilder, token: &str) -> Result<serde_json::Value, PersistenceError> {
        let resp = request
            .bearer_auth(token)
            .send()
            .map_err(|e| PersistenceError::Http(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().unwrap_or_default();
            return Err(PersistenceError::Api {
                status: status.as_u16(),
                message: message.trim().to_string(),
            });
        }
        resp.json()
            .map_err(|e| PersistenceError::Http(format!("unreadable response: {e}")))
    }

    fn ensure_tab(&self, target: &SinkTarget, token: &str) -> Result<(), PersistenceError> {
        let mut url = self.url(&target.destination, &[])?;
        url.query_pairs_mut().append_pair("fields", "sheets.properties.title");
        let meta: SpreadsheetMeta = serde_json::from_value(self.send(self.client.get(url), token)?)
            .map_err(|e| PersistenceError::Http(format!("unexpected spreadsheet metadata: {e}")))?;

        if meta.sheets.iter().any(|s| s.properties.title == target.tab) {
            return Ok(());
        }

        tracing::info!(tab = %target.tab, "adding worksheet");
        let url = self.url(&format!("{}:batchUpdate", target.destination), &[])?;
        let body = json!({
            "requests": [{
                "addSheet": {
                    "properties": {
                        "title": target.tab,
                        "gridProperties": { "rowCount": 1000, "columnCount": 20 }
                    }
                }
            }]
        });
        self.send(self.client.post(url).json(&body), token)?;
        Ok(())
    }
}

fn is_loopback(api_base: &str) -> bool {
    Url::parse(api_base)
        .ok()
        .and_then(|u| u.host_str().map(|h| h == "localhost" || h == "127.0.0.1" || h == "[::1]"))
        .unwrap_or(false)
}

/// A1 range covering a whole worksheet.
fn tab_range(tab: &str) -> String {
    format!("'{}'", tab.replace('\'', "''"))
}

impl TableSink for GoogleSheetsSink {
    fn name(&self) -> &str {
        "google_sheets"
    }

    fn write(&self, bars: &[Bar], target: &SinkTarget) -> Result<usize, PersistenceError> {
        let token = self.token()?;
        self.ensure_tab(target, &token)?;

        let range = tab_range(&target.tab);
        let clear = self.url(&target.destination, &["values", &format!("{range}:clear")])?;
        self.send(self.client.post(clear).json(&json!({})), &token)?;

        let mut append = self.url(&target.destination, &["values", &format!("{range}:append")])?;
        append
            .query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        let body = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": sheet_rows(bars),
        });
        self.send(self.client.post(append).json(&body), &token)?;

        tracing::info!(tab = %target.tab, rows = bars.len(), "wrote worksheet");
        Ok(bars.len())
    }
}
