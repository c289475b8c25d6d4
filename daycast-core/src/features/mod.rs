//! Feature Engine — bars in, leakage-free feature rows plus a direction target out.
//!
//! Every predictor attributed to day t is computed from bars strictly before t
//! (previous close change, 5/10-day SMAs ending at t-1). The target for day t
//! compares close[t] with close[t-1] and is the only unlagged quantity.
//!
//! Same-day open/high/low/volume are carried unlagged by default for
//! compatibility; `SameDayPolicy::Lagged` swaps in the previous day's values.

mod engine;
mod row;

pub use engine::{engineer, engineer_with, WARMUP_BARS};
pub use row::{FeatureColumn, FeatureRow, FeatureTable, SameDayPolicy};
