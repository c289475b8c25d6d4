//! Domain types for daycast

pub mod bar;
pub mod direction;

pub use bar::Bar;
pub use direction::{Direction, ValidationOutcome};

/// Symbol type alias
pub type Symbol = String;

/// True when `symbol` can name a file without escaping its directory.
pub fn is_file_safe(symbol: &str) -> bool {
    !symbol.is_empty()
        && !symbol.contains("..")
        && !symbol.chars().any(|c| matches!(c, '/' | '\\' | ':' | '\0'))
}
