//! Seeded random train/test partition of row indices.

use super::ModelError;
use crate::rng::RngHierarchy;
use rand::seq::SliceRandom;

/// Shuffle `0..n` with a generator derived from `seed` and cut it in two.
///
/// `n_test = ceil(n * test_fraction)`; the first `n_test` shuffled indices
/// form the test set and the rest the training set. Both sides must be
/// non-empty.
pub fn train_test_split(
    n: usize,
    test_fraction: f64,
    seed: u64,
) -> Result<(Vec<usize>, Vec<usize>), ModelError> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InvalidSplit(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }
    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ModelError::InvalidSplit(format!(
            "{n} rows cannot be split with test fraction {test_fraction}"
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.shuffle(&mut RngHierarchy::new(seed).rng_for("split", 0));
    let train = order.split_off(n_test);
    Ok((train, order))
}
