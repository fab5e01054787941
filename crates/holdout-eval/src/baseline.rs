use std::convert::Infallible;

use holdout_io::BinaryLabel;

use crate::classifier::Classifier;

/// Predicts the most frequent training label for every row.
///
/// Ties go to [`BinaryLabel::Above`]. Useful as a chance-level reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct MajorityClassifier;

impl Classifier for MajorityClassifier {
    type Model = BinaryLabel;
    type Error = Infallible;

    fn name(&self) -> &str {
        "majority"
    }

    fn fit(&self, _features: &[Vec<f64>], labels: &[BinaryLabel], _seed: u64) -> Result<BinaryLabel, Infallible> {
        let n_above = labels.iter().filter(|&&l| l == BinaryLabel::Above).count();
        Ok(if 2 * n_above >= labels.len() {
            BinaryLabel::Above
        } else {
            BinaryLabel::Below
        })
    }

    fn predict(&self, model: &BinaryLabel, features: &[Vec<f64>]) -> Result<Vec<BinaryLabel>, Infallible> {
        Ok(vec![*model; features.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicts_majority_level() {
        let labels = [BinaryLabel::Below, BinaryLabel::Below, BinaryLabel::Above];
        let model = MajorityClassifier.fit(&[], &labels, 0).unwrap();
        assert_eq!(model, BinaryLabel::Below);
        let predicted = MajorityClassifier.predict(&model, &[vec![], vec![]]).unwrap();
        assert_eq!(predicted, vec![BinaryLabel::Below; 2]);
    }

    #[test]
    fn ties_go_to_above() {
        let labels = [BinaryLabel::Below, BinaryLabel::Above];
        assert_eq!(MajorityClassifier.fit(&[], &labels, 0).unwrap(), BinaryLabel::Above);
    }
}
