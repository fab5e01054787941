//! Per-column missing-value counts.

use holdout_io::Dataset;
use tracing::{debug, instrument};

/// Missing-value count for one column.
#[derive(Debug, Clone, PartialEq)]
pub struct MissingCount {
    /// Column name.
    pub column: String,
    /// Number of missing cells.
    pub n_missing: usize,
    /// `n_missing / n_rows`; 0.0 for an empty dataset.
    pub fraction: f64,
}

/// Count missing cells in every column, in file order.
#[instrument(skip_all, fields(n_rows = dataset.n_rows(), n_columns = dataset.n_columns()))]
pub fn missing_summary(dataset: &Dataset) -> Vec<MissingCount> {
    let n_rows = dataset.n_rows();
    let counts: Vec<MissingCount> = dataset
        .columns()
        .map(|(name, column)| {
            let n_missing = column.n_missing();
            MissingCount {
                column: name.to_string(),
                n_missing,
                fraction: if n_rows == 0 {
                    0.0
                } else {
                    n_missing as f64 / n_rows as f64
                },
            }
        })
        .collect();

    debug!(
        n_incomplete_columns = counts.iter().filter(|c| c.n_missing > 0).count(),
        "missing values counted"
    );
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use holdout_io::Column;

    #[test]
    fn counts_per_column() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                Column::Numeric(vec![Some(1.0), None, None, Some(2.0)]),
                Column::Categorical {
                    levels: vec!["x".into()],
                    codes: vec![Some(0), Some(0), Some(0), Some(0)],
                },
            ],
        )
        .unwrap();
        let summary = missing_summary(&ds);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].n_missing, 2);
        assert!((summary[0].fraction - 0.5).abs() < f64::EPSILON);
        assert_eq!(summary[1].n_missing, 0);
    }
}
