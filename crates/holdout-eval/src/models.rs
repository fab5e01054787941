//! [`Classifier`] adapters over the QDA and Random Forest crates.

use holdout_io::BinaryLabel;
use holdout_qda::{QdaConfig, QdaError, QdaModel};
use holdout_rf::{ImportanceMode, RandomForest, RandomForestConfig, RfError};

use crate::classifier::Classifier;

fn class_indices(labels: &[BinaryLabel]) -> Vec<usize> {
    labels.iter().map(|l| l.index()).collect()
}

/// Map predicted class indices back to labels; `out_of_range` receives
/// the offending class and its row.
fn to_labels<E>(classes: &[usize], out_of_range: impl Fn(usize, usize) -> E) -> Result<Vec<BinaryLabel>, E> {
    classes
        .iter()
        .enumerate()
        .map(|(i, &c)| BinaryLabel::from_index(c).ok_or_else(|| out_of_range(c, i)))
        .collect()
}

/// Quadratic discriminant analysis.
#[derive(Debug, Clone)]
pub struct QdaClassifier {
    config: QdaConfig,
}

impl QdaClassifier {
    /// Wrap a two-class QDA configuration.
    #[must_use]
    pub fn new(config: QdaConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &QdaConfig {
        &self.config
    }
}

impl Classifier for QdaClassifier {
    type Model = QdaModel;
    type Error = QdaError;

    fn name(&self) -> &str {
        "qda"
    }

    fn fit(&self, features: &[Vec<f64>], labels: &[BinaryLabel], _seed: u64) -> Result<QdaModel, QdaError> {
        self.config.fit(features, &class_indices(labels))
    }

    fn predict(&self, model: &QdaModel, features: &[Vec<f64>]) -> Result<Vec<BinaryLabel>, QdaError> {
        let classes = model.predict_batch(features)?;
        to_labels(&classes, |label, sample_index| QdaError::LabelOutOfRange {
            label,
            n_classes: 2,
            sample_index,
        })
    }
}

/// Random Forest; each fit reseeds the forest with the trial seed.
///
/// Per-fit importance ranking is switched off since trial forests are
/// only used for prediction.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    config: RandomForestConfig,
}

impl RandomForestClassifier {
    #[must_use]
    pub fn new(config: RandomForestConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &RandomForestConfig {
        &self.config
    }
}

impl Classifier for RandomForestClassifier {
    type Model = RandomForest;
    type Error = RfError;

    fn name(&self) -> &str {
        "random_forest"
    }

    fn fit(&self, features: &[Vec<f64>], labels: &[BinaryLabel], seed: u64) -> Result<RandomForest, RfError> {
        let names: Vec<String> = (0..features.first().map_or(0, Vec::len))
            .map(|i| format!("x{i}"))
            .collect();
        self.config
            .clone()
            .with_seed(seed)
            .with_importance_mode(ImportanceMode::Disabled)
            .fit(features, &class_indices(labels), &names)
            .map(|result| result.into_forest())
    }

    fn predict(&self, model: &RandomForest, features: &[Vec<f64>]) -> Result<Vec<BinaryLabel>, RfError> {
        let classes = model.predict_batch(features)?;
        to_labels(&classes, |label, sample_index| RfError::LabelOutOfRange {
            label,
            n_classes: 2,
            sample_index,
        })
    }
}
