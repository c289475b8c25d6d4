//! Random forest: bootstrap-aggregated decision trees.
//!
//! Each tree draws a bootstrap sample of the training rows and searches
//! `max_features` random features per node. Tree i takes its generator from
//! `RngHierarchy::new(seed).rng_for("tree", i)`, so a fit is fully reproducible
//! for a given seed. Prediction averages leaf probabilities and labels a row
//! `1` only when the mean exceeds 0.5.

use super::tree::{DecisionTreeClassifier, MaxFeatures, TreeParams};
use super::{check_labels, Classifier, ModelError};
use crate::rng::RngHierarchy;
use ndarray::ArrayView2;
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_trees: usize,
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
    pub bootstrap: bool,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            min_samples_split: 10,
            max_depth: None,
            max_features: MaxFeatures::Sqrt,
            bootstrap: true,
            seed: 42,
        }
    }
}

impl ForestParams {
    fn tree_params(&self) -> TreeParams {
        TreeParams {
            min_samples_split: self.min_samples_split,
            max_depth: self.max_depth,
            max_features: self.max_features,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    params: ForestParams,
    trees: Vec<DecisionTreeClassifier>,
}

impl RandomForestClassifier {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
        }
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    pub fn n_fitted_trees(&self) -> usize {
        self.trees.len()
    }

    /// Mean P(label = 1) across trees for each row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>, ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::NotFitted);
        }
        let mut sums = vec![0.0; x.nrows()];
        for tree in &self.trees {
            for (sum, p) in sums.iter_mut().zip(tree.predict_proba(x)?) {
                *sum += p;
            }
        }
        let n = self.trees.len() as f64;
        Ok(sums.into_iter().map(|s| s / n).collect())
    }
}

impl Default for RandomForestClassifier {
    fn default() -> Self {
        Self::new(ForestParams::default())
    }
}

impl Classifier for RandomForestClassifier {
    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[u8]) -> Result<(), ModelError> {
        check_labels(x, y)?;
        if self.params.n_trees == 0 {
            return Err(ModelError::InvalidSplit("forest needs at least one tree".into()));
        }

        let n = y.len();
        let rngs = RngHierarchy::new(self.params.seed);
        let mut trees = Vec::with_capacity(self.params.n_trees);

        for i in 0..self.params.n_trees {
            let mut rng = rngs.rng_for("tree", i as u64);
            let sample: Vec<usize> = if self.params.bootstrap {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            } else {
                (0..n).collect()
            };
            let mut tree = DecisionTreeClassifier::new(self.params.tree_params(), self.params.seed);
            tree.fit_sample(x, y, sample, &mut rng)?;
            trees.push(tree);
        }

        tracing::debug!(trees = trees.len(), rows = n, "random forest fitted");
        self.trees = trees;
        Ok(())
    }

    fn predict(&self, x: ArrayView2<'_, f64>) -> Result<Vec<u8>, ModelError> {
        Ok(self
            .predict_proba(x)?
            .into_iter()
            .map(|p| u8::from(p > 0.5))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Two noisy clusters separable on column 1; column 0 is noise.
    fn clusters(n: usize) -> (Array2<f64>, Vec<u8>) {
        let x = Array2::from_shape_fn((n, 2), |(i, j)| {
            let up = i % 2 == 1;
            match j {
                0 => ((i * 37) % 11) as f64,
                _ => if up { 10.0 + (i % 5) as f64 } else { (i % 5) as f64 },
            }
        });
        let y = (0..n).map(|i| (i % 2) as u8).collect();
        (x, y)
    }

    fn small_forest(seed: u64) -> RandomForestClassifier {
        RandomForestClassifier::new(ForestParams {
            n_trees: 15,
            seed,
            ..ForestParams::default()
        })
    }

    #[test]
    fn default_params_match_reference_model() {
        let p = ForestParams::default();
        assert_eq!(p.n_trees, 100);
        assert_eq!(p.min_samples_split, 10);
        assert_eq!(p.seed, 42);
        assert_eq!(p.max_features, MaxFeatures::Sqrt);
        assert!(p.bootstrap);
    }

    #[test]
    fn separable_data_scores_perfectly() {
        let (x, y) = clusters(60);
        let mut forest = RandomForestClassifier::new(ForestParams {
            n_trees: 15,
            max_features: MaxFeatures::All,
            ..ForestParams::default()
        });
        forest.fit(x.view(), &y).unwrap();
        assert_eq!(forest.n_fitted_trees(), 15);
        assert_eq!(forest.score(x.view(), &y).unwrap(), 1.0);
    }

    #[test]
    fn same_seed_same_probabilities() {
        let (x, y) = clusters(40);
        let mut a = small_forest(42);
        let mut b = small_forest(42);
        a.fit(x.view(), &y).unwrap();
        b.fit(x.view(), &y).unwrap();
        assert_eq!(a.predict_proba(x.view()).unwrap(), b.predict_proba(x.view()).unwrap());
    }

    #[test]
    fn refit_replaces_trees() {
        let (x, y) = clusters(40);
        let mut forest = small_forest(1);
        forest.fit(x.view(), &y).unwrap();
        forest.fit(x.view(), &y).unwrap();
        assert_eq!(forest.n_fitted_trees(), 15);
    }

    #[test]
    fn unfitted_forest_errors() {
        let (x, _) = clusters(4);
        assert_eq!(
            RandomForestClassifier::default().predict(x.view()),
            Err(ModelError::NotFitted)
        );
    }

    #[test]
    fn zero_trees_rejected() {
        let (x, y) = clusters(4);
        let mut forest = RandomForestClassifier::new(ForestParams {
            n_trees: 0,
            ..ForestParams::default()
        });
        assert!(matches!(forest.fit(x.view(), &y), Err(ModelError::InvalidSplit(_))));
    }
}
