//! Near-zero-variance screening.

use std::collections::HashMap;

use holdout_io::{Column, Dataset};
use tracing::{debug, info, instrument};

use crate::error::EdaError;

/// Thresholds for near-zero-variance screening.
///
/// A column is flagged when it has at most one distinct value, or when its
/// most common value is more than `freq_cut` times as frequent as the second
/// most common **and** distinct values make up at most `unique_cut` percent
/// of the rows.
///
/// # Defaults
///
/// | Parameter    | Default  |
/// |--------------|----------|
/// | `freq_cut`   | 95 / 5   |
/// | `unique_cut` | 10       |
#[derive(Debug, Clone, Copy)]
pub struct NzvConfig {
    freq_cut: f64,
    unique_cut: f64,
}

impl NzvConfig {
    /// Create a config with default thresholds.
    #[must_use]
    pub fn new() -> Self {
        Self {
            freq_cut: 95.0 / 5.0,
            unique_cut: 10.0,
        }
    }

    /// Set the frequency-ratio cutoff.
    #[must_use]
    pub fn with_freq_cut(mut self, freq_cut: f64) -> Self {
        self.freq_cut = freq_cut;
        self
    }

    /// Set the percent-unique cutoff.
    #[must_use]
    pub fn with_unique_cut(mut self, unique_cut: f64) -> Self {
        self.unique_cut = unique_cut;
        self
    }

    /// Return the frequency-ratio cutoff.
    #[must_use]
    pub fn freq_cut(&self) -> f64 {
        self.freq_cut
    }

    /// Return the percent-unique cutoff.
    #[must_use]
    pub fn unique_cut(&self) -> f64 {
        self.unique_cut
    }

    fn validate(&self) -> Result<(), EdaError> {
        if !self.freq_cut.is_finite() || self.freq_cut <= 0.0 {
            return Err(EdaError::InvalidFreqCut {
                freq_cut: self.freq_cut,
            });
        }
        if !(0.0..=100.0).contains(&self.unique_cut) {
            return Err(EdaError::InvalidUniqueCut {
                unique_cut: self.unique_cut,
            });
        }
        Ok(())
    }
}

impl Default for NzvConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Variance diagnostic for a single column.
#[derive(Debug, Clone, PartialEq)]
pub struct VarianceDiagnostic {
    /// Column name.
    pub column: String,
    /// Count of the most common value over the count of the second most
    /// common. 0.0 when there are fewer than two distinct values.
    pub freq_ratio: f64,
    /// Distinct non-missing values as a percentage of all rows.
    pub percent_unique: f64,
    /// At most one distinct non-missing value.
    pub zero_var: bool,
    /// Flagged as near-zero variance.
    pub nzv: bool,
}

/// Screen every column of `dataset` for zero and near-zero variance.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EdaError::InvalidFreqCut`] | `freq_cut` is not positive and finite |
/// | [`EdaError::InvalidUniqueCut`] | `unique_cut` is outside [0, 100] |
#[instrument(skip_all, fields(n_columns = dataset.n_columns()))]
pub fn near_zero_variance(
    dataset: &Dataset,
    config: &NzvConfig,
) -> Result<Vec<VarianceDiagnostic>, EdaError> {
    config.validate()?;

    let diagnostics: Vec<VarianceDiagnostic> = dataset
        .columns()
        .map(|(name, column)| diagnose(name, column, dataset.n_rows(), config))
        .collect();

    let flagged: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.nzv)
        .map(|d| d.column.as_str())
        .collect();
    info!(n_flagged = flagged.len(), ?flagged, "near-zero variance screen complete");

    Ok(diagnostics)
}

fn diagnose(name: &str, column: &Column, n_rows: usize, config: &NzvConfig) -> VarianceDiagnostic {
    let mut freq: HashMap<u64, usize> = HashMap::new();
    for row in 0..column.len() {
        if let Some(key) = column.key(row) {
            *freq.entry(key).or_insert(0) += 1;
        }
    }

    let mut counts: Vec<usize> = freq.into_values().collect();
    counts.sort_unstable_by(|a, b| b.cmp(a));

    let n_unique = counts.len();
    let freq_ratio = match counts.as_slice() {
        [first, second, ..] => *first as f64 / *second as f64,
        _ => 0.0,
    };
    let percent_unique = if n_rows == 0 {
        0.0
    } else {
        100.0 * n_unique as f64 / n_rows as f64
    };
    let zero_var = n_unique <= 1;
    let nzv = zero_var || (freq_ratio > config.freq_cut && percent_unique <= config.unique_cut);

    debug!(column = name, freq_ratio, percent_unique, zero_var, nzv, "column screened");

    VarianceDiagnostic {
        column: name.to_string(),
        freq_ratio,
        percent_unique,
        zero_var,
        nzv,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric(values: &[f64]) -> Column {
        Column::Numeric(values.iter().copied().map(Some).collect())
    }

    fn dataset(columns: Vec<(&str, Column)>) -> Dataset {
        let (names, cols): (Vec<String>, Vec<Column>) =
            columns.into_iter().map(|(n, c)| (n.to_string(), c)).unzip();
        Dataset::new(names, cols).unwrap()
    }

    #[test]
    fn constant_column_is_zero_var() {
        let ds = dataset(vec![("c", numeric(&[3.0; 20]))]);
        let d = &near_zero_variance(&ds, &NzvConfig::new()).unwrap()[0];
        assert!(d.zero_var);
        assert!(d.nzv);
        assert!((d.freq_ratio - 0.0).abs() < f64::EPSILON);
        assert!((d.percent_unique - 5.0).abs() < 1e-12);
    }

    #[test]
    fn dominant_value_with_few_uniques_is_nzv() {
        // 98 zeros, 2 ones: ratio 49 > 19, 2% unique <= 10.
        let mut values = vec![0.0; 98];
        values.extend([1.0, 1.0]);
        let ds = dataset(vec![("rare", numeric(&values))]);
        let d = &near_zero_variance(&ds, &NzvConfig::new()).unwrap()[0];
        assert!(!d.zero_var);
        assert!((d.freq_ratio - 49.0).abs() < 1e-12);
        assert!((d.percent_unique - 2.0).abs() < 1e-12);
        assert!(d.nzv);
    }

    #[test]
    fn well_spread_column_is_kept() {
        let values: Vec<f64> = (0..50).map(f64::from).collect();
        let ds = dataset(vec![("x", numeric(&values))]);
        let d = &near_zero_variance(&ds, &NzvConfig::new()).unwrap()[0];
        assert!((d.freq_ratio - 1.0).abs() < f64::EPSILON);
        assert!(!d.nzv);
    }

    #[test]
    fn missing_cells_are_ignored_for_frequencies() {
        let ds = dataset(vec![(
            "m",
            Column::Numeric(vec![Some(1.0), None, None, Some(1.0)]),
        )]);
        let d = &near_zero_variance(&ds, &NzvConfig::new()).unwrap()[0];
        assert!(d.zero_var);
        assert!((d.percent_unique - 25.0).abs() < 1e-12);
    }

    #[test]
    fn categorical_columns_are_screened() {
        let ds = dataset(vec![(
            "site",
            Column::Categorical {
                levels: vec!["a".into(), "b".into()],
                codes: vec![Some(0), Some(1), Some(0), Some(1)],
            },
        )]);
        let d = &near_zero_variance(&ds, &NzvConfig::new()).unwrap()[0];
        assert!(!d.nzv);
    }

    #[test]
    fn invalid_cuts_rejected() {
        let ds = dataset(vec![("x", numeric(&[1.0, 2.0]))]);
        assert!(matches!(
            near_zero_variance(&ds, &NzvConfig::new().with_freq_cut(0.0)),
            Err(EdaError::InvalidFreqCut { .. })
        ));
        assert!(matches!(
            near_zero_variance(&ds, &NzvConfig::new().with_unique_cut(120.0)),
            Err(EdaError::InvalidUniqueCut { .. })
        ));
    }
}
