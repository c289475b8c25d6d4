//! Canonical bar order: ascending unique dates, no void bars.

use crate::domain::Bar;

/// Sort by date, keep the first bar for each date, drop bars with NaN prices.
pub fn canonicalize(mut bars: Vec<Bar>) -> Vec<Bar> {
    bars.retain(|b| !b.is_void());
    // Stable sort keeps provider order among duplicates, so dedup keeps the first.
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);
    bars
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 5, day).unwrap(),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10,
        }
    }

    #[test]
    fn sorts_ascending() {
        let out = canonicalize(vec![bar(3, 3.0), bar(1, 1.0), bar(2, 2.0)]);
        let days: Vec<f64> = out.iter().map(|b| b.close).collect();
        assert_eq!(days, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn keeps_first_duplicate() {
        let out = canonicalize(vec![bar(1, 1.0), bar(2, 2.0), bar(1, 9.0)]);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].close, 1.0);
    }

    #[test]
    fn drops_void_bars() {
        let out = canonicalize(vec![bar(1, 1.0), bar(2, f64::NAN), bar(3, 3.0)]);
        assert_eq!(out.len(), 2);
        assert!(out.windows(2).all(|w| w[0].date < w[1].date));
    }
}
