use rand::Rng;

use crate::node::FeatureIndex;

/// Criterion for measuring the quality of a split.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitCriterion {
    /// Gini impurity: 1 - Σ(p_i²)
    Gini,
    /// Information entropy: -Σ(p_i · ln(p_i))
    Entropy,
}

impl SplitCriterion {
    /// Compute the impurity of a node from its class counts.
    ///
    /// Returns 0.0 when `n_samples` is zero.
    #[must_use]
    pub fn impurity(&self, class_counts: &[usize], n_samples: usize) -> f64 {
        if n_samples == 0 {
            return 0.0;
        }
        let n = n_samples as f64;
        let proportions = class_counts.iter().filter(|&&c| c > 0).map(|&c| c as f64 / n);
        match self {
            SplitCriterion::Gini => 1.0 - proportions.map(|p| p * p).sum::<f64>(),
            SplitCriterion::Entropy => -proportions.map(|p| p * p.ln()).sum::<f64>(),
        }
    }
}

/// The winning split of a node.
#[derive(Debug, Clone)]
pub(crate) struct BestSplit {
    pub(crate) feature: FeatureIndex,
    pub(crate) threshold: f64,
    /// `n·I(parent) − n_l·I(left) − n_r·I(right)`.
    pub(crate) impurity_decrease: f64,
    pub(crate) left: Vec<usize>,
    pub(crate) right: Vec<usize>,
}

/// Training data and constraints shared by every split search in a tree.
///
/// `columns` is column-major: `columns[feature][sample]`. Sample indices
/// passed to [`SplitSearch::best`] may repeat (bootstrap multiplicity).
pub(crate) struct SplitSearch<'a> {
    pub(crate) columns: &'a [Vec<f64>],
    pub(crate) labels: &'a [usize],
    pub(crate) n_classes: usize,
    pub(crate) criterion: SplitCriterion,
    pub(crate) max_features: usize,
    pub(crate) min_samples_leaf: usize,
}

impl SplitSearch<'_> {
    /// Find the best split over `max_features` randomly drawn features.
    ///
    /// For each candidate feature the node's samples are sorted by value and
    /// scanned once with running class counts. Returns `None` when no
    /// candidate feature separates the samples while honouring
    /// `min_samples_leaf`.
    pub(crate) fn best(
        &self,
        indices: &[usize],
        parent_counts: &[usize],
        parent_impurity: f64,
        rng: &mut impl Rng,
    ) -> Option<BestSplit> {
        let n_features = self.columns.len();
        let n = indices.len();
        if n < 2 || n_features == 0 {
            return None;
        }

        // Partial Fisher-Yates over the feature indices.
        let mut candidates: Vec<usize> = (0..n_features).collect();
        let take = self.max_features.min(n_features);
        for i in 0..take {
            let j = rng.gen_range(i..n_features);
            candidates.swap(i, j);
        }

        let parent_score = n as f64 * parent_impurity;
        let mut best: Option<(usize, f64, f64)> = None;
        let mut sorted: Vec<(f64, usize)> = Vec::with_capacity(n);

        for &feature in &candidates[..take] {
            let column = &self.columns[feature];
            sorted.clear();
            sorted.extend(indices.iter().map(|&s| (column[s], self.labels[s])));
            sorted.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_counts = vec![0usize; self.n_classes];
            let mut right_counts = parent_counts.to_vec();

            for pos in 0..n - 1 {
                let (value, class) = sorted[pos];
                left_counts[class] += 1;
                right_counts[class] -= 1;

                let next = sorted[pos + 1].0;
                if value == next {
                    continue;
                }
                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < self.min_samples_leaf || n_right < self.min_samples_leaf {
                    continue;
                }

                let decrease = parent_score
                    - n_left as f64 * self.criterion.impurity(&left_counts, n_left)
                    - n_right as f64 * self.criterion.impurity(&right_counts, n_right);
                if best.is_none_or(|(_, _, d)| decrease > d) {
                    best = Some((feature, (value + next) / 2.0, decrease));
                }
            }
        }

        let (feature, threshold, impurity_decrease) = best?;
        let column = &self.columns[feature];
        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&s| column[s] <= threshold);

        Some(BestSplit {
            feature: FeatureIndex::new(feature),
            threshold,
            impurity_decrease,
            left,
            right,
        })
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    fn search<'a>(columns: &'a [Vec<f64>], labels: &'a [usize], min_leaf: usize) -> SplitSearch<'a> {
        SplitSearch {
            columns,
            labels,
            n_classes: 2,
            criterion: SplitCriterion::Gini,
            max_features: columns.len(),
            min_samples_leaf: min_leaf,
        }
    }

    #[test]
    fn gini_values() {
        assert!((SplitCriterion::Gini.impurity(&[10, 0], 10) - 0.0).abs() < f64::EPSILON);
        assert!((SplitCriterion::Gini.impurity(&[5, 5], 10) - 0.5).abs() < f64::EPSILON);
        assert!((SplitCriterion::Gini.impurity(&[0, 0], 0) - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn entropy_values() {
        assert!((SplitCriterion::Entropy.impurity(&[4, 0], 4) - 0.0).abs() < f64::EPSILON);
        assert!((SplitCriterion::Entropy.impurity(&[5, 5], 10) - 2.0_f64.ln()).abs() < 1e-12);
    }

    #[test]
    fn separable_feature_is_chosen() {
        let columns = vec![
            vec![0.3, 0.1, 0.9, 0.2, 0.4, 0.8],
            vec![1.0, 2.0, 3.0, 10.0, 11.0, 12.0],
        ];
        let labels = vec![0, 0, 0, 1, 1, 1];
        let indices: Vec<usize> = (0..6).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let split = search(&columns, &labels, 1)
            .best(&indices, &[3, 3], 0.5, &mut rng)
            .expect("should find a split");
        assert_eq!(split.feature.index(), 1);
        assert!(split.threshold > 3.0 && split.threshold < 10.0);
        assert_eq!(split.left, vec![0, 1, 2]);
        assert_eq!(split.right, vec![3, 4, 5]);
        assert!((split.impurity_decrease - 3.0).abs() < 1e-12);
    }

    #[test]
    fn repeated_indices_carry_weight() {
        let columns = vec![vec![1.0, 2.0, 3.0]];
        let labels = vec![0, 1, 1];
        let indices = vec![0, 0, 1, 2, 2];
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let split = search(&columns, &labels, 1)
            .best(&indices, &[2, 3], SplitCriterion::Gini.impurity(&[2, 3], 5), &mut rng)
            .unwrap();
        assert_eq!(split.left, vec![0, 0]);
        assert_eq!(split.right.len(), 3);
    }

    #[test]
    fn constant_feature_returns_none() {
        let columns = vec![vec![5.0; 4]];
        let labels = vec![0, 0, 1, 1];
        let indices: Vec<usize> = (0..4).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!(search(&columns, &labels, 1).best(&indices, &[2, 2], 0.5, &mut rng).is_none());
    }

    #[test]
    fn min_samples_leaf_enforced() {
        let columns = vec![vec![1.0, 10.0]];
        let labels = vec![0, 1];
        let indices = vec![0, 1];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        assert!(search(&columns, &labels, 2).best(&indices, &[1, 1], 0.5, &mut rng).is_none());
    }
}
