//! Majority-vote prediction for the ensemble.

use rayon::iter::{IntoParallelIterator, ParallelIterator};

use crate::error::RfError;
use crate::forest::RandomForest;
use crate::node::majority;

/// Per-class tree votes for one sample.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassVotes {
    counts: Vec<usize>,
}

impl ClassVotes {
    pub(crate) fn new(counts: Vec<usize>) -> Self {
        Self { counts }
    }

    /// Class with the most votes; the lowest index wins ties.
    #[must_use]
    pub fn predicted_class(&self) -> usize {
        majority(&self.counts)
    }

    /// Vote fractions, one per class, summing to 1.0.
    #[must_use]
    pub fn fractions(&self) -> Vec<f64> {
        let total: usize = self.counts.iter().sum();
        if total == 0 {
            return vec![0.0; self.counts.len()];
        }
        self.counts.iter().map(|&c| c as f64 / total as f64).collect()
    }

    /// Raw vote counts.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.counts
    }

    /// Total number of votes cast.
    #[must_use]
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

impl RandomForest {
    /// Predict the class of a single sample by majority vote.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, RfError> {
        Ok(self.votes(sample)?.predicted_class())
    }

    /// Count the votes of every tree for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn votes(&self, sample: &[f64]) -> Result<ClassVotes, RfError> {
        self.check_width(sample)?;
        Ok(self.votes_from(self.trees.iter().map(|t| t.walk(sample).0)))
    }

    /// Vote fractions for a single sample.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] when `sample.len() != n_features`.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, RfError> {
        Ok(self.votes(sample)?.fractions())
    }

    /// Predict classes for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.predict(sample))
            .collect()
    }

    /// Vote counts for a batch of samples in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`RfError::PredictionFeatureMismatch`] if any sample has the wrong width.
    pub fn votes_batch(&self, features: &[Vec<f64>]) -> Result<Vec<ClassVotes>, RfError> {
        features
            .into_par_iter()
            .map(|sample| self.votes(sample))
            .collect()
    }

    pub(crate) fn votes_from(&self, predictions: impl Iterator<Item = usize>) -> ClassVotes {
        let mut counts = vec![0usize; self.n_classes];
        for class in predictions {
            counts[class] += 1;
        }
        ClassVotes::new(counts)
    }

    fn check_width(&self, sample: &[f64]) -> Result<(), RfError> {
        if sample.len() != self.n_features {
            return Err(RfError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[must_use]
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RandomForestConfig;

    #[test]
    fn ties_go_to_lowest_class() {
        let votes = ClassVotes::new(vec![4, 4]);
        assert_eq!(votes.predicted_class(), 0);
        assert_eq!(votes.fractions(), vec![0.5, 0.5]);
        assert_eq!(votes.total(), 8);
    }

    #[test]
    fn fractions_of_empty_votes_are_zero() {
        assert_eq!(ClassVotes::new(vec![0, 0]).fractions(), vec![0.0, 0.0]);
    }

    #[test]
    fn every_tree_votes_once() {
        let features: Vec<Vec<f64>> = (0..20).map(|i| vec![f64::from(i)]).collect();
        let labels: Vec<usize> = (0..20).map(|i| usize::from(i >= 10)).collect();
        let result = RandomForestConfig::new(25)
            .unwrap()
            .fit(&features, &labels, &["x".to_string()])
            .unwrap();
        let forest = result.forest();
        let votes = forest.votes(&[15.0]).unwrap();
        assert_eq!(votes.total(), 25);
        assert_eq!(forest.n_trees(), 25);
        let fractions = forest.predict_proba(&[15.0]).unwrap();
        assert!((fractions.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(forest.votes_batch(&features).unwrap().len(), 20);
    }

    #[test]
    fn wrong_width_rejected() {
        let features = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let result = RandomForestConfig::new(3)
            .unwrap()
            .fit(&features, &[0, 1], &["a".to_string(), "b".to_string()])
            .unwrap();
        assert!(matches!(
            result.forest().predict(&[1.0]),
            Err(RfError::PredictionFeatureMismatch { expected: 2, got: 1 })
        ));
        assert!(result.forest().predict_batch(&[vec![1.0, 2.0, 3.0]]).is_err());
    }
}
