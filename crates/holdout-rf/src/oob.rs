//! Out-of-bag error estimation.

use crate::error::RfError;
use crate::forest::RandomForest;

/// Out-of-bag evaluation of a fitted forest.
#[derive(Debug, Clone)]
pub struct OobScore {
    /// Fraction of OOB-evaluated samples whose OOB vote is wrong.
    pub error_rate: f64,
    /// Samples left out of at least one bootstrap.
    pub n_oob_samples: usize,
    /// `confusion[true][predicted]` over OOB-evaluated samples.
    pub confusion: Vec<Vec<usize>>,
}

impl OobScore {
    /// Per-class error rates, `NaN` for a class with no OOB samples.
    #[must_use]
    pub fn class_error(&self) -> Vec<f64> {
        self.confusion
            .iter()
            .enumerate()
            .map(|(class, row)| {
                let total: usize = row.iter().sum();
                if total == 0 {
                    f64::NAN
                } else {
                    (total - row[class]) as f64 / total as f64
                }
            })
            .collect()
    }
}

/// Each sample is predicted by majority vote of only the trees whose
/// bootstrap left it out; samples in every bag are skipped.
pub(crate) fn oob_score(
    forest: &RandomForest,
    features: &[Vec<f64>],
    labels: &[usize],
    out_of_bag: &[Vec<usize>],
) -> Result<OobScore, RfError> {
    let mut voters: Vec<Vec<usize>> = vec![Vec::new(); features.len()];
    for (tree, samples) in out_of_bag.iter().enumerate() {
        for &sample in samples {
            voters[sample].push(tree);
        }
    }

    let n_classes = forest.n_classes;
    let mut confusion = vec![vec![0usize; n_classes]; n_classes];
    let mut n_oob_samples = 0;
    let mut n_wrong = 0;
    for (sample, trees) in voters.iter().enumerate() {
        if trees.is_empty() {
            continue;
        }
        let row = &features[sample];
        let votes = forest.votes_from(trees.iter().map(|&t| forest.trees[t].walk(row).0));
        let predicted = votes.predicted_class();
        confusion[labels[sample]][predicted] += 1;
        n_oob_samples += 1;
        if predicted != labels[sample] {
            n_wrong += 1;
        }
    }

    if n_oob_samples == 0 {
        return Err(RfError::OobEvaluationFailed {
            reason: "every sample was drawn into every bootstrap".to_string(),
        });
    }

    Ok(OobScore {
        error_rate: n_wrong as f64 / n_oob_samples as f64,
        n_oob_samples,
        confusion,
    })
}
