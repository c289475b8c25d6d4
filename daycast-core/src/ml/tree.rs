//! CART decision tree classifier with Gini impurity.
//!
//! Split thresholds sit at midpoints between consecutive distinct feature
//! values; rows with `value <= threshold` go left. At each node a random
//! subset of `max_features` non-constant features is searched; if none of them
//! separates the node, the search continues through the remaining features.

use super::{check_labels, Classifier, ModelError};
use ndarray::{ArrayView1, ArrayView2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Number of features searched per node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MaxFeatures {
    All,
    /// floor(sqrt(n_features)), at least 1.
    Sqrt,
    Count(usize),
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        let k = match self {
            MaxFeatures::All => n_features,
            MaxFeatures::Sqrt => (n_features as f64).sqrt() as usize,
            MaxFeatures::Count(k) => k,
        };
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    /// A node with fewer samples than this becomes a leaf.
    pub min_samples_split: usize,
    pub max_depth: Option<usize>,
    pub max_features: MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_samples_split: 2,
            max_depth: None,
            max_features: MaxFeatures::All,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Leaf {
        /// Fraction of training samples at this leaf labelled 1.
        p_up: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    params: TreeParams,
    seed: u64,
    root: Option<Node>,
    n_features: usize,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl DecisionTreeClassifier {
    pub fn new(params: TreeParams, seed: u64) -> Self {
        Self {
            params,
            seed,
            root: None,
            n_features: 0,
        }
    }

    pub fn params(&self) -> &TreeParams {
        &self.params
    }

    /// Depth of the fitted tree (a lone leaf has depth 0).
    pub fn depth(&self) -> usize {
        fn walk(node: &Node) -> usize {
            match node {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(left).max(walk(right)),
            }
        }
        self.root.as_ref().map_or(0, walk)
    }

    /// Fit on the rows named by `sample` (duplicates allowed, as in a bootstrap draw).
    pub(crate) fn fit_sample(
        &mut self,
        x: ArrayView2<'_, f64>,
        y: &[u8],
        sample: Vec<usize>,
        rng: &mut StdRng,
    ) -> Result<(), ModelError> {
        check_labels(x, y)?;
        if sample.is_empty() {
            return Err(ModelError::EmptyInput);
        }
        self.n_features = x.ncols();
        self.root = Some(self.build(x, y, sample, 0, rng));
        Ok(())
    }

    /// P(label = 1) for each row.
    pub fn predict_proba(&self, x: ArrayView2<'_, f64>) -> Result<Vec<f64>, ModelError> {
        let root = self.root.as_ref().ok_or(ModelError::NotFitted)?;
        if x.ncols() != self.n_features {
            return Err(ModelError::FeatureCountMismatch {
                expected: self.n_features,
                actual: x.ncols(),
            });
        }
        Ok(x.rows().into_iter().map(|row| leaf_value(root, row)).collect())
    }

    fn build(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[u8],
        sample: Vec<usize>,
        depth: usize,
        rng: &mut StdRng,
    ) -> Node {
        let n = sample.len();
        let ups = sample.iter().filter(|&&i| y[i] == 1).count();
        let leaf = Node::Leaf {
            p_up: ups as f64 / n as f64,
        };

        let depth_reached = self.params.max_depth.is_some_and(|d| depth >= d);
        if n < self.params.min_samples_split || ups == 0 || ups == n || depth_reached {
            return leaf;
        }

        let Some(best) = self.find_split(x, y, &sample, rng) else {
            return leaf;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .into_iter()
            .partition(|&i| x[[i, best.feature]] <= best.threshold);

        Node::Split {
            feature: best.feature,
            threshold: best.threshold,
            left: Box::new(self.build(x, y, left, depth + 1, rng)),
            right: Box::new(self.build(x, y, right, depth + 1, rng)),
        }
    }

    fn find_split(
        &self,
        x: ArrayView2<'_, f64>,
        y: &[u8],
        sample: &[usize],
        rng: &mut StdRng,
    ) -> Option<BestSplit> {
        let mut features: Vec<usize> = (0..x.ncols()).collect();
        features.shuffle(rng);
        let budget = self.params.max_features.resolve(x.ncols());

        let mut best: Option<BestSplit> = None;
        let mut searched = 0;
        for feature in features {
            if searched >= budget && best.is_some() {
                break;
            }
            let Some(candidate) = best_split_on(x, y, sample, feature) else {
                continue; // constant at this node
            };
            searched += 1;
            if best.as_ref().map_or(true, |b| candidate.impurity < b.impurity) {
                best = Some(candidate);
            }
        }
        best
    }
}

/// Lowest weighted Gini split on one feature, or None if the feature is constant.
fn best_split_on(
    x: ArrayView2<'_, f64>,
    y: &[u8],
    sample: &[usize],
    feature: usize,
) -> Option<BestSplit> {
    let mut values: Vec<(f64, u8)> = sample.iter().map(|&i| (x[[i, feature]], y[i])).collect();
    values.sort_by(|a, b| a.0.total_cmp(&b.0));

    let n = values.len();
    let total_ups = values.iter().filter(|v| v.1 == 1).count();
    let mut left_ups = 0;
    let mut best: Option<BestSplit> = None;

    for i in 0..n - 1 {
        left_ups += usize::from(values[i].1 == 1);
        let (lo, hi) = (values[i].0, values[i + 1].0);
        if lo >= hi {
            continue;
        }
        let left_n = i + 1;
        let right_n = n - left_n;
        let impurity = left_n as f64 * gini(left_ups, left_n)
            + right_n as f64 * gini(total_ups - left_ups, right_n);

        if best.as_ref().map_or(true, |b| impurity < b.impurity) {
            let mut threshold = lo + (hi - lo) / 2.0;
            if threshold >= hi || !threshold.is_finite() {
                threshold = lo;
            }
            best = Some(BestSplit {
                feature,
                threshold,
                impurity,
            });
        }
    }
    best
}

fn gini(ups: usize, n: usize) -> f64 {
    let p = ups as f64 / n as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

fn leaf_value(mut node: &Node, row: ArrayView1<'_, f64>) -> f64 {
    loop {
        match node {
            Node::Leaf { p_up } => return *p_up,
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                node = if row[*feature] <= *threshold { left } else { right };
            }
        }
    }
}

impl Classifier for DecisionTreeClassifier {
    fn name(&self) -> &str {
        "decision_tree"
    }

    fn fit(&mut self, x: ArrayView2<'_, f64>, y: &[u8]) -> Result<(), ModelError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.fit_sample(x, y, (0..y.len()).collect(), &mut rng)
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
    use ndarray::array;

    #[test]
    fn learns_single_threshold() {
        let x = array![[1.0], [2.0], [3.0], [10.0], [11.0], [12.0]];
        let y = [0, 0, 0, 1, 1, 1];
        let mut tree = DecisionTreeClassifier::new(TreeParams::default(), 1);
        tree.fit(x.view(), &y).unwrap();

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(array![[0.0], [6.4], [6.6], [20.0]].view()).unwrap(), vec![0, 0, 1, 1]);
        assert_eq!(tree.score(x.view(), &y).unwrap(), 1.0);
    }

    #[test]
    fn min_samples_split_limits_growth() {
        let x = array![[1.0], [2.0], [3.0], [4.0]];
        let y = [0, 1, 0, 1];
        let params = TreeParams {
            min_samples_split: 10,
            ..TreeParams::default()
        };
        let mut tree = DecisionTreeClassifier::new(params, 1);
        tree.fit(x.view(), &y).unwrap();
        assert_eq!(tree.depth(), 0);
        assert_eq!(tree.predict_proba(array![[2.5]].view()).unwrap(), vec![0.5]);
    }

    #[test]
    fn tie_probability_predicts_down() {
        let x = array![[1.0], [1.0]];
        let mut tree = DecisionTreeClassifier::new(TreeParams::default(), 1);
        tree.fit(x.view(), &[0, 1]).unwrap();
        assert_eq!(tree.predict(array![[1.0]].view()).unwrap(), vec![0]);
    }

    #[test]
    fn skips_constant_feature_even_with_budget_one() {
        // Column 0 is constant; column 1 separates the classes.
        let x = array![[5.0, 1.0], [5.0, 2.0], [5.0, 8.0], [5.0, 9.0]];
        let y = [0, 0, 1, 1];
        let params = TreeParams {
            max_features: MaxFeatures::Count(1),
            ..TreeParams::default()
        };
        for seed in 0..8 {
            let mut tree = DecisionTreeClassifier::new(params, seed);
            tree.fit(x.view(), &y).unwrap();
            assert_eq!(tree.score(x.view(), &y).unwrap(), 1.0, "seed {seed}");
        }
    }

    #[test]
    fn max_depth_caps_tree() {
        let x = array![[1.0], [2.0], [3.0], [4.0], [5.0], [6.0]];
        let y = [0, 1, 0, 1, 0, 1];
        let params = TreeParams {
            max_depth: Some(1),
            ..TreeParams::default()
        };
        let mut tree = DecisionTreeClassifier::new(params, 3);
        tree.fit(x.view(), &y).unwrap();
        assert!(tree.depth() <= 1);
    }

    #[test]
    fn predict_before_fit_errors() {
        let tree = DecisionTreeClassifier::new(TreeParams::default(), 0);
        assert_eq!(tree.predict(array![[1.0]].view()), Err(ModelError::NotFitted));
    }

    #[test]
    fn predict_rejects_wrong_width() {
        let mut tree = DecisionTreeClassifier::new(TreeParams::default(), 0);
        tree.fit(array![[1.0, 2.0], [3.0, 4.0]].view(), &[0, 1]).unwrap();
        assert_eq!(
            tree.predict(array![[1.0]].view()),
            Err(ModelError::FeatureCountMismatch {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(7), 2);
        assert_eq!(MaxFeatures::Sqrt.resolve(1), 1);
        assert_eq!(MaxFeatures::All.resolve(7), 7);
        assert_eq!(MaxFeatures::Count(20).resolve(7), 7);
        assert_eq!(MaxFeatures::Count(0).resolve(7), 1);
    }
}
