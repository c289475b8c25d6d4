//! Price-history sources.
//!
//! Providers make exactly one attempt per call; `fetch_history` wraps any
//! provider with the retry policy and canonicalizes the result.

pub mod canonicalize;
pub mod csv_import;
pub mod provider;
pub mod retry;
pub mod synthetic;
pub mod yahoo;

pub use canonicalize::canonicalize;
pub use csv_import::CsvProvider;
pub use provider::{DataError, DataProvider, DataSource, FetchResult, HistoryWindow};
pub use retry::{fetch_history, RetryPolicy};
pub use synthetic::{SyntheticPattern, SyntheticProvider};
pub use yahoo::YahooProvider;
