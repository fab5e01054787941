//! Covariate screening report combining every diagnostic.

use holdout_io::Dataset;
use tracing::{info, instrument};

use crate::correlation::{CorrelationMatrix, find_correlation};
use crate::error::EdaError;
use crate::missing::{MissingCount, missing_summary};
use crate::variance::{NzvConfig, VarianceDiagnostic, near_zero_variance};

/// Why a covariate was screened out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NearZeroVariance,
    HighCorrelation,
}

impl DropReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            DropReason::NearZeroVariance => "near_zero_variance",
            DropReason::HighCorrelation => "high_correlation",
        }
    }
}

/// Diagnostics for a set of covariates.
///
/// The correlation matrix covers the numeric covariates that survive the
/// near-zero-variance screen; categorical covariates are never dropped
/// for correlation.
#[derive(Debug, Clone)]
pub struct EdaReport {
    pub missing: Vec<MissingCount>,
    pub variance: Vec<VarianceDiagnostic>,
    pub correlation: CorrelationMatrix,
    pub correlation_cutoff: f64,
    pub highly_correlated: Vec<String>,
    covariates: Vec<String>,
}

impl EdaReport {
    /// Run every diagnostic over `covariates`.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EdaError::Io`] | A covariate is not a column of `dataset` |
    /// | [`EdaError::InvalidFreqCut`] | Invalid `nzv` frequency cutoff |
    /// | [`EdaError::InvalidUniqueCut`] | Invalid `nzv` unique cutoff |
    /// | [`EdaError::InvalidCutoff`] | `cutoff` is outside [0, 1] |
    #[instrument(skip_all, fields(n_covariates = covariates.len(), cutoff = cutoff))]
    pub fn build(
        dataset: &Dataset,
        covariates: &[String],
        nzv: &NzvConfig,
        cutoff: f64,
    ) -> Result<Self, EdaError> {
        let selected = dataset.select(covariates)?;
        let missing = missing_summary(&selected);
        let variance = near_zero_variance(&selected, nzv)?;

        let numeric: Vec<String> = variance
            .iter()
            .filter(|d| !d.nzv)
            .filter(|d| selected.column(&d.column).is_some_and(|c| c.is_numeric()))
            .map(|d| d.column.clone())
            .collect();
        let correlation = CorrelationMatrix::pearson(&selected, &numeric)?;
        let highly_correlated = find_correlation(&correlation, cutoff)?;

        let report = Self {
            missing,
            variance,
            correlation,
            correlation_cutoff: cutoff,
            highly_correlated,
            covariates: covariates.to_vec(),
        };
        info!(
            n_retained = report.retained().len(),
            n_dropped = report.dropped().len(),
            "covariate screen complete"
        );
        Ok(report)
    }

    /// `true` if any screened covariate has a missing cell.
    #[must_use]
    pub fn has_missing(&self) -> bool {
        self.missing.iter().any(|m| m.n_missing > 0)
    }

    /// Covariates flagged as near-zero variance, in input order.
    #[must_use]
    pub fn near_zero_variance_columns(&self) -> Vec<String> {
        self.variance
            .iter()
            .filter(|d| d.nzv)
            .map(|d| d.column.clone())
            .collect()
    }

    /// Screened-out covariates with the reason, in input order.
    #[must_use]
    pub fn dropped(&self) -> Vec<(String, DropReason)> {
        self.covariates
            .iter()
            .filter_map(|name| self.drop_reason(name).map(|r| (name.clone(), r)))
            .collect()
    }

    /// Covariates that pass every screen, in input order.
    #[must_use]
    pub fn retained(&self) -> Vec<String> {
        self.covariates
            .iter()
            .filter(|name| self.drop_reason(name).is_none())
            .cloned()
            .collect()
    }

    fn drop_reason(&self, name: &str) -> Option<DropReason> {
        if self.variance.iter().any(|d| d.nzv && d.column == name) {
            Some(DropReason::NearZeroVariance)
        } else if self.highly_correlated.iter().any(|c| c == name) {
            Some(DropReason::HighCorrelation)
        } else {
            None
        }
    }
}
