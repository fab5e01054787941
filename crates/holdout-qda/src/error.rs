/// Errors from QDA fitting and prediction.
#[derive(Debug, thiserror::Error)]
pub enum QdaError {
    /// Returned when fewer than two classes are requested.
    #[error("QDA needs at least 2 classes, got {n_classes}")]
    InvalidClassCount {
        /// The invalid class count.
        n_classes: usize,
    },

    /// Returned when the rank tolerance is not a positive finite number.
    #[error("tolerance must be positive and finite, got {tol}")]
    InvalidTolerance {
        /// The invalid tolerance.
        tol: f64,
    },

    /// Returned when the number of priors differs from the class count.
    #[error("got {got} priors for {expected} classes")]
    PriorCountMismatch {
        /// Number of classes.
        expected: usize,
        /// Number of priors provided.
        got: usize,
    },

    /// Returned when a prior is negative or not finite.
    #[error("prior for class {class} is invalid: {value}")]
    InvalidPrior {
        /// Class index.
        class: usize,
        /// The offending prior.
        value: f64,
    },

    /// Returned when priors do not sum to one.
    #[error("priors must sum to 1, got {sum}")]
    PriorsNotNormalized {
        /// Sum of the provided priors.
        sum: f64,
    },

    /// Returned when the training set has no samples.
    #[error("training dataset has zero samples")]
    EmptyDataset,

    /// Returned when the training rows have no columns.
    #[error("training dataset has zero feature columns")]
    ZeroFeatures,

    /// Returned when the label count differs from the sample count.
    #[error("got {n_labels} labels for {n_samples} samples")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when a row has a different width than the first row.
    #[error("sample {sample_index} has {got} features, expected {expected}")]
    FeatureCountMismatch {
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Zero-based row index.
        sample_index: usize,
    },

    /// Returned when a training value is NaN or infinite.
    #[error("non-finite value at sample {sample_index}, feature {feature_index}")]
    NonFiniteValue {
        /// Zero-based row index.
        sample_index: usize,
        /// Zero-based column index.
        feature_index: usize,
    },

    /// Returned when a label is not below the class count.
    #[error("label {label} at sample {sample_index} is out of range for {n_classes} classes")]
    LabelOutOfRange {
        /// The offending label.
        label: usize,
        /// Configured class count.
        n_classes: usize,
        /// Zero-based row index.
        sample_index: usize,
    },

    /// Returned when a class has at most as many samples as features.
    #[error("class {class} has {n_samples} samples, needs more than {n_features}")]
    GroupTooSmall {
        /// Class index.
        class: usize,
        /// Samples in the class.
        n_samples: usize,
        /// Number of features.
        n_features: usize,
    },

    /// Returned when a feature is constant within a class.
    #[error("feature {feature} is constant within class {class}")]
    ZeroVariance {
        /// Class index.
        class: usize,
        /// Zero-based feature index.
        feature: usize,
    },

    /// Returned when a class correlation matrix is numerically singular.
    #[error("rank deficiency in class {class}: pivot {pivot} below tolerance {tol}")]
    RankDeficient {
        /// Class index.
        class: usize,
        /// The smallest Cholesky diagonal encountered.
        pivot: f64,
        /// Configured tolerance.
        tol: f64,
    },

    /// Returned when a prediction row has the wrong width.
    #[error("prediction input has {got} features, expected {expected}")]
    PredictionFeatureMismatch {
        /// Training width.
        expected: usize,
        /// Width of the prediction row.
        got: usize,
    },
}
