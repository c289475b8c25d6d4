//! Invocation payload: `{"stock_symbol": "AAPL"}`.

use serde::Deserialize;

use crate::runner::RunError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionRequest {
    pub symbol: String,
}

#[derive(Debug, Deserialize)]
struct RawRequest {
    stock_symbol: Option<String>,
}

impl PredictionRequest {
    pub fn new(symbol: impl Into<String>) -> Result<Self, RunError> {
        let symbol = symbol.into().trim().to_string();
        if symbol.is_empty() {
            return Err(RunError::Input("Stock symbol not provided.".into()));
        }
        Ok(Self { symbol })
    }

    /// Parse the JSON invocation string. Shell wrappers sometimes leave the
    /// payload inside single quotes, so those are stripped first.
    pub fn parse(raw: &str) -> Result<Self, RunError> {
        let body = raw.trim().trim_matches('\'');
        let parsed: RawRequest = serde_json::from_str(body)
            .map_err(|e| RunError::Input(format!("Invalid request payload: {e}")))?;
        Self::new(parsed.stock_symbol.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_json() {
        let req = PredictionRequest::parse(r#"{"stock_symbol": "AAPL"}"#).unwrap();
        assert_eq!(req.symbol, "AAPL");
    }

    #[test]
    fn strips_single_quotes_and_whitespace() {
        let req = PredictionRequest::parse(" '{\"stock_symbol\": \" MSFT \"}' ").unwrap();
        assert_eq!(req.symbol, "MSFT");
    }

    #[test]
    fn missing_or_empty_symbol_is_input_error() {
        for raw in [r#"{}"#, r#"{"stock_symbol": ""}"#, r#"{"stock_symbol": null}"#] {
            let err = PredictionRequest::parse(raw).unwrap_err();
            assert_eq!(err.to_string(), "Stock symbol not provided.");
        }
    }

    #[test]
    fn malformed_json_is_input_error() {
        assert!(matches!(
            PredictionRequest::parse("not json"),
            Err(RunError::Input(_))
        ));
    }
}
