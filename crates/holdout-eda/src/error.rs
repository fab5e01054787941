use holdout_io::IoError;

/// Errors from exploratory analysis and target binarization.
#[derive(Debug, thiserror::Error)]
pub enum EdaError {
    /// Returned when the correlation cutoff is outside [0, 1].
    #[error("correlation cutoff must be in [0, 1], got {cutoff}")]
    InvalidCutoff {
        /// The invalid cutoff provided.
        cutoff: f64,
    },

    /// Returned when the frequency-ratio cutoff is not a positive finite number.
    #[error("freq_cut must be positive and finite, got {freq_cut}")]
    InvalidFreqCut {
        /// The invalid value provided.
        freq_cut: f64,
    },

    /// Returned when the percent-unique cutoff is outside [0, 100].
    #[error("unique_cut must be in [0, 100], got {unique_cut}")]
    InvalidUniqueCut {
        /// The invalid value provided.
        unique_cut: f64,
    },

    /// Returned when the target has no values to binarize.
    #[error("target has zero values")]
    EmptyTarget,

    /// Returned when a target value is missing.
    #[error("target value missing at row {row_index}")]
    MissingTarget {
        /// Zero-based row index of the missing value.
        row_index: usize,
    },

    /// Returned when an explicit threshold is NaN or infinite.
    #[error("threshold must be finite, got {threshold}")]
    NonFiniteThreshold {
        /// The invalid threshold.
        threshold: f64,
    },

    /// Returned when every observation falls on one side of the threshold.
    #[error("all {n} observations are \"{level}\" at threshold {threshold}; label would not be binary")]
    SingleLevel {
        /// The only level produced.
        level: &'static str,
        /// Number of observations.
        n: usize,
        /// The resolved threshold.
        threshold: f64,
    },

    /// Wraps a dataset access error.
    #[error(transparent)]
    Io(#[from] IoError),
}
