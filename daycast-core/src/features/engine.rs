use super::row::{FeatureRow, FeatureTable, SameDayPolicy};
use crate::domain::Bar;
use crate::indicators::{BarField, CloseChange, Field, Indicator, Lagged, Sma};

/// Leading bars consumed by the longest lagged window (10-day SMA, lagged one day).
pub const WARMUP_BARS: usize = 10;

/// Engineer features with same-day columns carried unlagged.
pub fn engineer(bars: &[Bar]) -> FeatureTable {
    engineer_with(bars, SameDayPolicy::Current)
}

/// Engineer features from an ordered bar series.
///
/// Output length is `bars.len() - 10` for series longer than ten bars whose
/// prices are all defined, and empty otherwise. Never fails.
pub fn engineer_with(bars: &[Bar], policy: SameDayPolicy) -> FeatureTable {
    let price_change = Lagged::named(CloseChange, "price_change").compute(bars);
    let sma_5 = Lagged::named(Sma::new(5), "sma_5").compute(bars);
    let sma_10 = Lagged::named(Sma::new(10), "sma_10").compute(bars);

    let same_day = |field: BarField| -> Vec<f64> {
        match policy {
            SameDayPolicy::Current => Field::new(field).compute(bars),
            SameDayPolicy::Lagged => Lagged::new(Field::new(field)).compute(bars),
        }
    };
    let open = same_day(BarField::Open);
    let high = same_day(BarField::High);
    let low = same_day(BarField::Low);
    let volume = same_day(BarField::Volume);

    let mut rows = Vec::with_capacity(bars.len().saturating_sub(WARMUP_BARS));
    for t in 1..bars.len() {
        let row = FeatureRow {
            date: bars[t].date,
            open: open[t],
            high: high[t],
            low: low[t],
            close: bars[t].close,
            volume: volume[t],
            price_change: price_change[t],
            sma_5: sma_5[t],
            sma_10: sma_10[t],
            target: bars[t].direction_since(&bars[t - 1]).label(),
        };
        if row_is_defined(&row) && !bars[t - 1].close.is_nan() {
            rows.push(row);
        }
    }

    FeatureTable::new(rows)
}

fn row_is_defined(row: &FeatureRow) -> bool {
    [
        row.open,
        row.high,
        row.low,
        row.close,
        row.volume,
        row.price_change,
        row.sma_5,
        row.sma_10,
    ]
    .iter()
    .all(|v| v.is_finite())
}
