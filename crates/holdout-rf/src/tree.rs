use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, instrument};

use crate::RfError;
use crate::node::{Node, NodeIndex, majority};
use crate::split::{SplitCriterion, SplitSearch};

/// Configuration for a single CART decision tree.
///
/// Construct via [`DecisionTreeConfig::new`], then chain `with_*` methods.
///
/// # Defaults
///
/// | Parameter           | Default               |
/// |---------------------|-----------------------|
/// | `criterion`         | `Gini`                |
/// | `max_depth`         | `None` (unlimited)    |
/// | `min_samples_split` | 2                     |
/// | `min_samples_leaf`  | 1                     |
/// | `max_features`      | `None` (all features) |
/// | `seed`              | 42                    |
#[derive(Debug, Clone)]
pub struct DecisionTreeConfig {
    pub(crate) params: TreeParams,
    pub(crate) max_features: Option<usize>,
    pub(crate) seed: u64,
}

/// Stopping rules shared by a tree and every tree of a forest.
#[derive(Debug, Clone, Copy)]
pub(crate) struct TreeParams {
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_depth: Option<usize>,
    pub(crate) min_samples_split: usize,
    pub(crate) min_samples_leaf: usize,
}

impl DecisionTreeConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            params: TreeParams {
                criterion: SplitCriterion::Gini,
                max_depth: None,
                min_samples_split: 2,
                min_samples_leaf: 1,
            },
            max_features: None,
            seed: 42,
        }
    }

    /// Set the split quality criterion.
    #[must_use]
    pub fn with_criterion(mut self, criterion: SplitCriterion) -> Self {
        self.params.criterion = criterion;
        self
    }

    /// Set the maximum tree depth; the root is depth 0.
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.params.max_depth = max_depth;
        self
    }

    /// Set the minimum number of samples required to attempt a split.
    #[must_use]
    pub fn with_min_samples_split(mut self, min_samples_split: usize) -> Self {
        self.params.min_samples_split = min_samples_split;
        self
    }

    /// Set the minimum number of samples required in each leaf.
    #[must_use]
    pub fn with_min_samples_leaf(mut self, min_samples_leaf: usize) -> Self {
        self.params.min_samples_leaf = min_samples_leaf;
        self
    }

    /// Set the number of candidate features per split. `None` means all.
    #[must_use]
    pub fn with_max_features(mut self, max_features: Option<usize>) -> Self {
        self.max_features = max_features;
        self
    }

    /// Set the random seed for feature sampling.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn criterion(&self) -> SplitCriterion {
        self.params.criterion
    }

    #[must_use]
    pub fn max_depth(&self) -> Option<usize> {
        self.params.max_depth
    }

    #[must_use]
    pub fn min_samples_split(&self) -> usize {
        self.params.min_samples_split
    }

    #[must_use]
    pub fn min_samples_leaf(&self) -> usize {
        self.params.min_samples_leaf
    }

    #[must_use]
    pub fn max_features(&self) -> Option<usize> {
        self.max_features
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Fit a tree on row-major `features` with zero-based class `labels`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`RfError::EmptyDataset`] | `features` is empty |
    /// | [`RfError::ZeroFeatures`] | rows have no columns |
    /// | [`RfError::LabelCountMismatch`] | label and row counts differ |
    /// | [`RfError::FeatureCountMismatch`] | rows have inconsistent lengths |
    /// | [`RfError::NonFiniteValue`] | a value is NaN or infinite |
    /// | [`RfError::InvalidMaxDepth`] | `max_depth` is `Some(0)` |
    /// | [`RfError::InvalidMinSamplesSplit`] | `min_samples_split < 2` |
    /// | [`RfError::InvalidMinSamplesLeaf`] | `min_samples_leaf == 0` |
    /// | [`RfError::InvalidMaxFeatures`] | `max_features` outside [1, p] |
    #[instrument(skip_all, fields(n_samples = features.len()))]
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<DecisionTree, RfError> {
        if self.params.max_depth == Some(0) {
            return Err(RfError::InvalidMaxDepth { max_depth: 0 });
        }
        if self.params.min_samples_split < 2 {
            return Err(RfError::InvalidMinSamplesSplit {
                min_samples_split: self.params.min_samples_split,
            });
        }
        if self.params.min_samples_leaf == 0 {
            return Err(RfError::InvalidMinSamplesLeaf { min_samples_leaf: 0 });
        }

        let columns = to_columns(features, labels)?;
        let n_features = columns.len();
        let max_features = self.max_features.unwrap_or(n_features);
        if max_features == 0 || max_features > n_features {
            return Err(RfError::InvalidMaxFeatures {
                max_features,
                n_features,
            });
        }

        let n_classes = n_classes(labels);
        let indices: Vec<usize> = (0..labels.len()).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let tree = grow(
            &columns,
            labels,
            indices,
            n_classes,
            self.params,
            max_features,
            &mut rng,
        );
        debug!(n_nodes = tree.n_nodes(), depth = tree.depth(), "tree fitted");
        Ok(tree)
    }
}

impl Default for DecisionTreeConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A fitted CART classification tree stored as a node arena.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
    raw_importances: Vec<f64>,
}

impl DecisionTree {
    /// Predict the class of a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len()`
    /// differs from the training feature count.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        self.leaf(sample).map(|(prediction, _)| prediction)
    }

    /// Class proportions of the training samples in the sample's leaf.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] on a feature-count mismatch.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, RfError> {
        let (_, class_counts) = self.leaf(sample)?;
        let total: usize = class_counts.iter().sum();
        Ok(class_counts
            .iter()
            .map(|&c| if total == 0 { 0.0 } else { c as f64 / total as f64 })
            .collect())
    }

    /// Descend to a leaf without checking the sample width.
    pub(crate) fn walk(&self, sample: &[f64]) -> (usize, &[usize]) {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Leaf {
                    prediction,
                    class_counts,
                } => return (*prediction, class_counts),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    current = if sample[feature.index()] <= *threshold {
                        left.index()
                    } else {
                        right.index()
                    };
                }
            }
        }
    }

    fn leaf(&self, sample: &[f64]) -> Result<(usize, &[usize]), RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.walk(sample))
    }

    /// Impurity-decrease importances normalized to sum to 1.0.
    ///
    /// All zeros for a single-leaf tree.
    #[must_use]
    pub fn feature_importances(&self) -> Vec<f64> {
        let total: f64 = self.raw_importances.iter().sum();
        if total > 0.0 {
            self.raw_importances.iter().map(|v| v / total).collect()
        } else {
            vec![0.0; self.n_features]
        }
    }

    /// Unnormalized total impurity decrease per feature.
    pub(crate) fn raw_importances(&self) -> &[f64] {
        &self.raw_importances
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    /// Length of the longest root-to-leaf path (0 for a single leaf).
    #[must_use]
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: NodeIndex) -> usize {
            match &nodes[at.index()] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        walk(&self.nodes, NodeIndex::new(0))
    }
}

/// `max(label) + 1`, or 0 for no labels.
pub(crate) fn n_classes(labels: &[usize]) -> usize {
    labels.iter().max().map_or(0, |&m| m + 1)
}

/// Validate row-major training data and transpose it to column-major.
pub(crate) fn to_columns(features: &[Vec<f64>], labels: &[usize]) -> Result<Vec<Vec<f64>>, RfError> {
    let Some(first) = features.first() else {
        return Err(RfError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(RfError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(RfError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }

    let mut columns = vec![Vec::with_capacity(features.len()); n_features];
    for (sample_index, row) in features.iter().enumerate() {
        if row.len() != n_features {
            return Err(RfError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        for (feature_index, &value) in row.iter().enumerate() {
            if !value.is_finite() {
                return Err(RfError::NonFiniteValue {
                    sample_index,
                    feature_index,
                });
            }
            columns[feature_index].push(value);
        }
    }
    Ok(columns)
}

/// Grow a tree on pre-validated column-major data.
///
/// `indices` may contain duplicates; each occurrence counts as a sample.
pub(crate) fn grow(
    columns: &[Vec<f64>],
    labels: &[usize],
    indices: Vec<usize>,
    n_classes: usize,
    params: TreeParams,
    max_features: usize,
    rng: &mut impl Rng,
) -> DecisionTree {
    let mut grower = Grower {
        search: SplitSearch {
            columns,
            labels,
            n_classes,
            criterion: params.criterion,
            max_features,
            min_samples_leaf: params.min_samples_leaf,
        },
        params,
        rng,
        nodes: Vec::new(),
        raw_importances: vec![0.0; columns.len()],
    };
    grower.grow(indices, 0);

    DecisionTree {
        nodes: grower.nodes,
        n_features: columns.len(),
        n_classes,
        raw_importances: grower.raw_importances,
    }
}

struct Grower<'a, R> {
    search: SplitSearch<'a>,
    params: TreeParams,
    rng: &'a mut R,
    nodes: Vec<Node>,
    raw_importances: Vec<f64>,
}

impl<R: Rng> Grower<'_, R> {
    fn grow(&mut self, indices: Vec<usize>, depth: usize) -> NodeIndex {
        let mut counts = vec![0usize; self.search.n_classes];
        for &s in &indices {
            counts[self.search.labels[s]] += 1;
        }
        let n = indices.len();
        let impurity = self.params.criterion.impurity(&counts, n);

        let at = NodeIndex::new(self.nodes.len());
        let stop = impurity <= 0.0
            || n < self.params.min_samples_split
            || self.params.max_depth.is_some_and(|d| depth >= d);

        let split = if stop {
            None
        } else {
            self.search.best(&indices, &counts, impurity, &mut *self.rng)
        };
        let Some(split) = split else {
            self.nodes.push(Node::Leaf {
                prediction: majority(&counts),
                class_counts: counts,
            });
            return at;
        };

        // Reserve the slot so the parent keeps a lower index than its children.
        self.nodes.push(Node::Leaf {
            prediction: majority(&counts),
            class_counts: Vec::new(),
        });
        self.raw_importances[split.feature.index()] += split.impurity_decrease;

        let left = self.grow(split.left, depth + 1);
        let right = self.grow(split.right, depth + 1);
        self.nodes[at.index()] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
            n_samples: n,
            impurity_decrease: split.impurity_decrease,
        };
        at
    }
}
