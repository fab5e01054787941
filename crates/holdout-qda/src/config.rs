//! Configuration builder for QDA fitting.

use crate::error::QdaError;
use crate::model::QdaModel;

/// Configuration for quadratic discriminant analysis.
///
/// # Defaults
///
/// | Parameter | Default                   |
/// |-----------|---------------------------|
/// | `priors`  | class proportions `n_k/n` |
/// | `tol`     | 1e-4                      |
#[derive(Debug, Clone)]
pub struct QdaConfig {
    pub(crate) n_classes: usize,
    pub(crate) priors: Option<Vec<f64>>,
    pub(crate) tol: f64,
}

impl QdaConfig {
    /// Default tolerance for the rank check, relative to unit-variance features.
    pub const DEFAULT_TOL: f64 = 1e-4;

    /// Create a config for `n_classes` classes.
    ///
    /// # Errors
    ///
    /// Returns [`QdaError::InvalidClassCount`] if `n_classes < 2`.
    pub fn new(n_classes: usize) -> Result<Self, QdaError> {
        if n_classes < 2 {
            return Err(QdaError::InvalidClassCount { n_classes });
        }
        Ok(Self {
            n_classes,
            priors: None,
            tol: Self::DEFAULT_TOL,
        })
    }

    /// Use fixed class priors instead of the training proportions.
    #[must_use]
    pub fn with_priors(mut self, priors: Vec<f64>) -> Self {
        self.priors = Some(priors);
        self
    }

    /// Set the tolerance below which a scaled Cholesky pivot counts as zero.
    #[must_use]
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn priors(&self) -> Option<&[f64]> {
        self.priors.as_deref()
    }

    #[must_use]
    pub fn tol(&self) -> f64 {
        self.tol
    }

    pub(crate) fn validate(&self) -> Result<(), QdaError> {
        if !(self.tol.is_finite() && self.tol > 0.0) {
            return Err(QdaError::InvalidTolerance { tol: self.tol });
        }
        if let Some(priors) = &self.priors {
            if priors.len() != self.n_classes {
                return Err(QdaError::PriorCountMismatch {
                    expected: self.n_classes,
                    got: priors.len(),
                });
            }
            if let Some((class, &value)) = priors
                .iter()
                .enumerate()
                .find(|(_, p)| !p.is_finite() || **p < 0.0)
            {
                return Err(QdaError::InvalidPrior { class, value });
            }
            let sum: f64 = priors.iter().sum();
            if (sum - 1.0).abs() > 5e-6 {
                return Err(QdaError::PriorsNotNormalized { sum });
            }
        }
        Ok(())
    }

    /// Fit a QDA model on row-major `features` with class indices in
    /// `0..n_classes`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`QdaError::InvalidTolerance`] | `tol` is not positive and finite |
    /// | [`QdaError::PriorCountMismatch`] | priors length differs from `n_classes` |
    /// | [`QdaError::InvalidPrior`] | a prior is negative or not finite |
    /// | [`QdaError::PriorsNotNormalized`] | priors do not sum to 1 |
    /// | [`QdaError::EmptyDataset`] | `features` is empty |
    /// | [`QdaError::ZeroFeatures`] | rows have no columns |
    /// | [`QdaError::LabelCountMismatch`] | label and row counts differ |
    /// | [`QdaError::FeatureCountMismatch`] | rows have inconsistent widths |
    /// | [`QdaError::NonFiniteValue`] | a value is NaN or infinite |
    /// | [`QdaError::LabelOutOfRange`] | a label is `>= n_classes` |
    /// | [`QdaError::GroupTooSmall`] | a class has `<= p` samples (including none) |
    /// | [`QdaError::ZeroVariance`] | a feature is constant within a class |
    /// | [`QdaError::RankDeficient`] | a class correlation matrix is singular |
    pub fn fit(&self, features: &[Vec<f64>], labels: &[usize]) -> Result<QdaModel, QdaError> {
        self.validate()?;
        crate::model::fit(self, features, labels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = QdaConfig::new(2).unwrap();
        assert_eq!(config.n_classes(), 2);
        assert!(config.priors().is_none());
        assert!((config.tol() - 1e-4).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn single_class_rejected() {
        assert!(matches!(
            QdaConfig::new(1),
            Err(QdaError::InvalidClassCount { n_classes: 1 })
        ));
    }

    #[test]
    fn priors_validated() {
        let base = QdaConfig::new(2).unwrap();
        assert!(matches!(
            base.clone().with_priors(vec![1.0]).validate(),
            Err(QdaError::PriorCountMismatch { expected: 2, got: 1 })
        ));
        assert!(matches!(
            base.clone().with_priors(vec![1.5, -0.5]).validate(),
            Err(QdaError::InvalidPrior { class: 1, .. })
        ));
        assert!(matches!(
            base.clone().with_priors(vec![0.5, 0.6]).validate(),
            Err(QdaError::PriorsNotNormalized { .. })
        ));
        assert!(base.with_priors(vec![0.3, 0.7]).validate().is_ok());
    }

    #[test]
    fn tolerance_validated() {
        let config = QdaConfig::new(2).unwrap().with_tol(0.0);
        assert!(matches!(config.validate(), Err(QdaError::InvalidTolerance { .. })));
    }
}
