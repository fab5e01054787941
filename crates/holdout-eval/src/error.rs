/// Boxed error raised by a classifier during a trial.
pub type ClassifierError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from resampling evaluation.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// Returned when n_trials is zero.
    #[error("n_trials must be at least 1, got {n_trials}")]
    InvalidTrialCount {
        /// The invalid value provided.
        n_trials: usize,
    },

    /// Returned when the test fraction is not in (0, 1).
    #[error("test_fraction must be in (0, 1), got {fraction}")]
    InvalidTestFraction {
        /// The invalid value provided.
        fraction: f64,
    },

    /// Returned when the confidence level is not in (0, 1).
    #[error("confidence must be in (0, 1), got {confidence}")]
    InvalidConfidence {
        /// The invalid value provided.
        confidence: f64,
    },

    /// Returned when the labeled set has no observations.
    #[error("dataset has zero observations")]
    EmptyDataset,

    /// Returned when the label count differs from the row count.
    #[error("got {n_labels} labels for {n_samples} observations")]
    LabelCountMismatch {
        /// Number of feature rows.
        n_samples: usize,
        /// Number of labels.
        n_labels: usize,
    },

    /// Returned when the number of feature names differs from the row width.
    #[error("got {n_names} feature names for {n_features} features")]
    FeatureNameMismatch {
        /// Row width.
        n_features: usize,
        /// Number of names.
        n_names: usize,
    },

    /// Returned when a feature row has a different width than the first.
    #[error("row {row_index} has {got} features, expected {expected}")]
    RaggedRow {
        /// Width of the first row.
        expected: usize,
        /// Width of the offending row.
        got: usize,
        /// Zero-based row index.
        row_index: usize,
    },

    /// Returned when the test set would be empty.
    #[error("test set is empty: ceil({fraction} * {n_samples}) = 0")]
    EmptyTestSet {
        /// Number of observations.
        n_samples: usize,
        /// Configured test fraction.
        fraction: f64,
    },

    /// Returned when the training set would be empty.
    #[error("training set is empty: test set takes all {n_samples} observations")]
    EmptyTrainingSet {
        /// Number of observations.
        n_samples: usize,
    },

    /// Returned when one label level never occurs.
    #[error("label level \"{level}\" does not occur in {n_samples} observations")]
    MissingLevel {
        /// The absent level.
        level: &'static str,
        /// Number of observations.
        n_samples: usize,
    },

    /// Returned when a row index is out of range.
    #[error("row index {index} out of bounds for {n_samples} observations")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// Number of observations.
        n_samples: usize,
    },

    /// Returned when predictions and truth differ in length.
    #[error("got {n_predicted} predictions for {n_truth} test observations")]
    PredictionCountMismatch {
        /// Number of predictions.
        n_predicted: usize,
        /// Number of true labels.
        n_truth: usize,
    },

    /// Returned when paired error series differ in length.
    #[error("paired series lengths differ: {first} vs {second}")]
    SeriesLengthMismatch {
        /// Length of the first series.
        first: usize,
        /// Length of the second series.
        second: usize,
    },

    /// Returned when a classifier fails during a trial under `FailurePolicy::Abort`.
    #[error("trial {trial}: classifier {classifier} failed: {source}")]
    TrialFailed {
        /// Zero-based trial index.
        trial: usize,
        /// Name of the failing classifier.
        classifier: String,
        /// The classifier's error.
        source: ClassifierError,
    },
}
