//! Serializable artifact shapes written by [`ResultWriter`](crate::ResultWriter).
//!
//! Plain data only, so the writer has no dependency on the analysis crates.

use serde::Serialize;

/// Missing-value count for one column.
#[derive(Debug, Clone, Serialize)]
pub struct MissingEntry {
    pub column: String,
    pub n_missing: usize,
    pub fraction: f64,
}

/// Near-zero-variance diagnostic for one column.
#[derive(Debug, Clone, Serialize)]
pub struct VarianceEntry {
    pub column: String,
    pub freq_ratio: f64,
    pub percent_unique: f64,
    pub zero_var: bool,
    pub nzv: bool,
}

/// Contents of `{experiment}_explore.json`.
#[derive(Debug, Clone, Serialize)]
pub struct ExploreArtifact {
    pub experiment: String,
    pub n_rows: usize,
    pub n_columns: usize,
    pub target: String,
    pub missing: Vec<MissingEntry>,
    pub variance: Vec<VarianceEntry>,
    pub correlation_cutoff: f64,
    pub correlation_columns: Vec<String>,
    /// `NaN` entries serialize as `null`.
    pub correlation_matrix: Vec<Vec<f64>>,
    pub highly_correlated: Vec<String>,
}

/// A covariate removed before model fitting, and why.
#[derive(Debug, Clone, Serialize)]
pub struct DroppedFeature {
    pub name: String,
    pub reason: String,
}

/// Summary statistics of one error series.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryEntry {
    pub classifier: String,
    pub n_trials: usize,
    pub n_failed: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
}

/// Paired comparison of the two error series.
#[derive(Debug, Clone, Serialize)]
pub struct PairedEntry {
    pub mean_difference: f64,
    pub std_dev: Option<f64>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
    pub first_better: usize,
    pub second_better: usize,
    pub ties: usize,
}

/// Contents of `{experiment}_compare.json`.
#[derive(Debug, Clone, Serialize)]
pub struct CompareArtifact {
    pub experiment: String,
    pub seed: u64,
    pub n_rows: usize,
    pub n_trials: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub confidence: f64,
    pub target: String,
    pub threshold: f64,
    pub n_above: usize,
    pub n_below: usize,
    pub features: Vec<String>,
    pub dropped: Vec<DroppedFeature>,
    pub classifiers: Vec<String>,
    /// One series per classifier, in `classifiers` order. Failed trials are `null`.
    pub error_series: Vec<Vec<f64>>,
    pub summaries: Vec<SummaryEntry>,
    pub paired: Option<PairedEntry>,
}
