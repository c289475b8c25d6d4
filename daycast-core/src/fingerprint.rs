//! Dataset fingerprinting.
//!
//! A run is reproducible from `(dataset_hash, seed)`: the same bars and the
//! same seed always yield the same split, forest and prediction.

use crate::domain::Bar;

/// BLAKE3 hex digest over the canonical bar series.
///
/// Each bar contributes its ISO date, the bit patterns of its four prices and
/// its volume, so the hash is stable across platforms and float formatting.
pub fn dataset_hash(bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    for bar in bars {
        hasher.update(bar.date.format("%Y-%m-%d").to_string().as_bytes());
        for price in [bar.open, bar.high, bar.low, bar.close] {
            hasher.update(&price.to_bits().to_le_bytes());
        }
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
