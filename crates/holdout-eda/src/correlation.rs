//! Pearson correlation matrix and pairwise-correlation feature elimination.

use holdout_io::Dataset;
use tracing::{debug, info, instrument};

use crate::error::EdaError;

/// Symmetric matrix of Pearson correlations between named numeric columns.
#[derive(Debug, Clone)]
pub struct CorrelationMatrix {
    names: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Compute Pearson correlations between the named numeric columns.
    ///
    /// Each entry uses the rows where both columns are present. An entry is
    /// `NaN` when fewer than two such rows exist or either column is
    /// constant over them. The diagonal is 1.0 for non-constant columns.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EdaError::Io`] | A name is unknown or refers to a categorical column |
    #[instrument(skip_all, fields(n_columns = names.len()))]
    pub fn pearson(dataset: &Dataset, names: &[String]) -> Result<Self, EdaError> {
        let columns: Vec<&[Option<f64>]> = names
            .iter()
            .map(|n| dataset.numeric_column(n))
            .collect::<Result<_, _>>()?;

        let n = columns.len();
        let mut values = vec![vec![f64::NAN; n]; n];
        for i in 0..n {
            for j in i..n {
                let r = pairwise_pearson(columns[i], columns[j]);
                values[i][j] = r;
                values[j][i] = r;
            }
        }

        debug!(n, "correlation matrix computed");
        Ok(Self {
            names: names.to_vec(),
            values,
        })
    }

    /// Build a matrix from precomputed values.
    ///
    /// `values` must be square with one row per name.
    #[cfg(test)]
    #[must_use]
    pub(crate) fn from_values(names: Vec<String>, values: Vec<Vec<f64>>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        debug_assert!(values.iter().all(|row| row.len() == names.len()));
        Self { names, values }
    }

    /// Return the column names, in matrix order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Return the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Return `true` if the matrix has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Return the correlation between columns `i` and `j`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i][j]
    }

    /// Return the matrix rows.
    #[must_use]
    pub fn as_rows(&self) -> &[Vec<f64>] {
        &self.values
    }
}

fn pairwise_pearson(x: &[Option<f64>], y: &[Option<f64>]) -> f64 {
    let pairs: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter_map(|(a, b)| Some(((*a)?, (*b)?)))
        .collect();
    if pairs.len() < 2 {
        return f64::NAN;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(a, b) in &pairs {
        let dx = a - mean_x;
        let dy = b - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return f64::NAN;
    }
    (sxy / (sxx.sqrt() * syy.sqrt())).clamp(-1.0, 1.0)
}

/// Select columns to remove so that no retained pair has `|r| > cutoff`.
///
/// Columns are visited in descending order of mean absolute correlation
/// with the other columns. For each visited pair whose absolute correlation
/// exceeds `cutoff`, the member with the larger mean absolute correlation
/// against the columns still retained is removed (the later one on ties).
/// `NaN` correlations count as zero. The returned names follow matrix order.
///
/// # Errors
///
/// Returns [`EdaError::InvalidCutoff`] if `cutoff` is outside [0, 1].
#[instrument(skip_all, fields(n_columns = matrix.len(), cutoff = cutoff))]
pub fn find_correlation(matrix: &CorrelationMatrix, cutoff: f64) -> Result<Vec<String>, EdaError> {
    if !(0.0..=1.0).contains(&cutoff) {
        return Err(EdaError::InvalidCutoff { cutoff });
    }

    let n = matrix.len();
    let abs: Vec<Vec<f64>> = matrix
        .as_rows()
        .iter()
        .map(|row| row.iter().map(|r| if r.is_nan() { 0.0 } else { r.abs() }).collect())
        .collect();

    let mut removed = vec![false; n];
    let mean_abs = |i: usize, removed: &[bool]| -> f64 {
        let others: Vec<f64> = (0..n)
            .filter(|&k| k != i && !removed[k])
            .map(|k| abs[i][k])
            .collect();
        if others.is_empty() {
            0.0
        } else {
            others.iter().sum::<f64>() / others.len() as f64
        }
    };

    let initial: Vec<f64> = (0..n).map(|i| mean_abs(i, &removed)).collect();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| initial[b].total_cmp(&initial[a]));

    for (pos, &i) in order.iter().enumerate() {
        for &j in &order[pos + 1..] {
            if removed[i] {
                break;
            }
            if removed[j] || abs[i][j] <= cutoff {
                continue;
            }
            let mean_i = mean_abs(i, &removed);
            let mean_j = mean_abs(j, &removed);
            let victim = if mean_i > mean_j { i } else { j };
            removed[victim] = true;
            debug!(
                first = %matrix.names[i],
                second = %matrix.names[j],
                r = abs[i][j],
                removed = %matrix.names[victim],
                "highly correlated pair"
            );
        }
    }

    let dropped: Vec<String> = (0..n)
        .filter(|&i| removed[i])
        .map(|i| matrix.names[i].clone())
        .collect();
    info!(n_removed = dropped.len(), ?dropped, "correlation filter complete");
    Ok(dropped)
}
