use holdout_io::{BinaryLabel, DesignMatrix};

use crate::error::EvalError;

/// Numeric design matrix paired with one binary label per row.
#[derive(Debug, Clone)]
pub struct LabeledSet {
    features: Vec<Vec<f64>>,
    labels: Vec<BinaryLabel>,
    feature_names: Vec<String>,
}

impl LabeledSet {
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::LabelCountMismatch`] | `labels.len()` differs from the row count |
    /// | [`EvalError::FeatureNameMismatch`] | names and row width disagree |
    /// | [`EvalError::RaggedRow`] | rows have inconsistent widths |
    pub fn new(design: DesignMatrix, labels: Vec<BinaryLabel>) -> Result<Self, EvalError> {
        let DesignMatrix {
            feature_names,
            rows,
        } = design;
        if rows.len() != labels.len() {
            return Err(EvalError::LabelCountMismatch {
                n_samples: rows.len(),
                n_labels: labels.len(),
            });
        }
        let width = feature_names.len();
        if let Some((row_index, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != width) {
            return Err(if row_index == 0 {
                EvalError::FeatureNameMismatch {
                    n_features: row.len(),
                    n_names: width,
                }
            } else {
                EvalError::RaggedRow {
                    expected: width,
                    got: row.len(),
                    row_index,
                }
            });
        }
        Ok(Self {
            features: rows,
            labels,
            feature_names,
        })
    }

    /// Rows at `indices`, in the order given.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::IndexOutOfBounds`] for an index `>= n_samples`.
    pub fn subset(&self, indices: &[usize]) -> Result<Self, EvalError> {
        let n_samples = self.n_samples();
        if let Some(&index) = indices.iter().find(|&&i| i >= n_samples) {
            return Err(EvalError::IndexOutOfBounds { index, n_samples });
        }
        Ok(Self {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            labels: indices.iter().map(|&i| self.labels[i]).collect(),
            feature_names: self.feature_names.clone(),
        })
    }

    /// Count of each level, indexed by [`BinaryLabel::index`].
    #[must_use]
    pub fn level_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for label in &self.labels {
            counts[label.index()] += 1;
        }
        counts
    }

    #[must_use]
    pub fn features(&self) -> &[Vec<f64>] {
        &self.features
    }

    #[must_use]
    pub fn labels(&self) -> &[BinaryLabel] {
        &self.labels
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.labels.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn design(rows: Vec<Vec<f64>>, names: &[&str]) -> DesignMatrix {
        DesignMatrix {
            feature_names: names.iter().map(|s| s.to_string()).collect(),
            rows,
        }
    }

    #[test]
    fn subset_preserves_index_order() {
        let set = LabeledSet::new(
            design(vec![vec![0.0], vec![1.0], vec![2.0]], &["x"]),
            vec![BinaryLabel::Above, BinaryLabel::Below, BinaryLabel::Above],
        )
        .unwrap();
        let sub = set.subset(&[2, 0]).unwrap();
        assert_eq!(sub.features(), &[vec![2.0], vec![0.0]]);
        assert_eq!(sub.labels(), &[BinaryLabel::Above, BinaryLabel::Above]);
        assert_eq!(set.level_counts(), [2, 1]);
        assert!(matches!(
            set.subset(&[3]),
            Err(EvalError::IndexOutOfBounds { index: 3, n_samples: 3 })
        ));
    }

    #[test]
    fn shape_checks() {
        assert!(matches!(
            LabeledSet::new(design(vec![vec![0.0]], &["x"]), vec![]),
            Err(EvalError::LabelCountMismatch { n_samples: 1, n_labels: 0 })
        ));
        assert!(matches!(
            LabeledSet::new(design(vec![vec![0.0, 1.0]], &["x"]), vec![BinaryLabel::Above]),
            Err(EvalError::FeatureNameMismatch { .. })
        ));
        assert!(matches!(
            LabeledSet::new(
                design(vec![vec![0.0], vec![]], &["x"]),
                vec![BinaryLabel::Above, BinaryLabel::Below]
            ),
            Err(EvalError::RaggedRow { row_index: 1, .. })
        ));
    }
}
