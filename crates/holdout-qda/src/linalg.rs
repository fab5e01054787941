//! Dense Cholesky factorization for small symmetric matrices.

/// Lower-triangular factor `L` with `A = L Lᵀ`, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Cholesky {
    lower: Vec<Vec<f64>>,
}

impl Cholesky {
    /// Factor a symmetric positive-definite matrix.
    ///
    /// Fails with the offending diagonal of `L` when it falls below `tol`;
    /// a non-positive pivot reports 0.0.
    pub(crate) fn factor(a: &[Vec<f64>], tol: f64) -> Result<Self, f64> {
        let n = a.len();
        let mut lower = vec![vec![0.0; n]; n];
        for j in 0..n {
            let sum: f64 = (0..j).map(|k| lower[j][k] * lower[j][k]).sum();
            let pivot = a[j][j] - sum;
            let diag = if pivot > 0.0 { pivot.sqrt() } else { 0.0 };
            if diag < tol {
                return Err(diag);
            }
            lower[j][j] = diag;
            for i in j + 1..n {
                let sum: f64 = (0..j).map(|k| lower[i][k] * lower[j][k]).sum();
                lower[i][j] = (a[i][j] - sum) / diag;
            }
        }
        Ok(Self { lower })
    }

    /// Solve `L w = b` by forward substitution.
    pub(crate) fn solve_lower(&self, b: &[f64]) -> Vec<f64> {
        let n = self.lower.len();
        let mut w = vec![0.0; n];
        for i in 0..n {
            let sum: f64 = (0..i).map(|k| self.lower[i][k] * w[k]).sum();
            w[i] = (b[i] - sum) / self.lower[i][i];
        }
        w
    }

    /// `log |A| = 2 Σ log L_ii`.
    pub(crate) fn log_det(&self) -> f64 {
        2.0 * (0..self.lower.len()).map(|i| self.lower[i][i].ln()).sum::<f64>()
    }

    /// Smallest diagonal entry of `L`.
    pub(crate) fn min_pivot(&self) -> f64 {
        (0..self.lower.len())
            .map(|i| self.lower[i][i])
            .fold(f64::INFINITY, f64::min)
    }
}

/// `log Σ exp(v_i)` without overflow; `-inf` when every entry is `-inf`.
pub(crate) fn log_sum_exp(values: &[f64]) -> f64 {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max == f64::NEG_INFINITY {
        return max;
    }
    max + values.iter().map(|v| (v - max).exp()).sum::<f64>().ln()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn factors_known_matrix() {
        // [[4, 2], [2, 3]] = L Lᵀ with L = [[2, 0], [1, √2]].
        let chol = Cholesky::factor(&[vec![4.0, 2.0], vec![2.0, 3.0]], 1e-8).unwrap();
        assert!((chol.lower[0][0] - 2.0).abs() < 1e-12);
        assert!((chol.lower[1][0] - 1.0).abs() < 1e-12);
        assert!((chol.lower[1][1] - 2.0_f64.sqrt()).abs() < 1e-12);
        assert!((chol.log_det() - 8.0_f64.ln()).abs() < 1e-12);
        assert!((chol.min_pivot() - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn forward_substitution() {
        let chol = Cholesky::factor(&[vec![4.0, 2.0], vec![2.0, 3.0]], 1e-8).unwrap();
        let w = chol.solve_lower(&[2.0, 1.0 + 2.0_f64.sqrt()]);
        assert!((w[0] - 1.0).abs() < 1e-12);
        assert!((w[1] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn singular_matrix_rejected() {
        let perfectly_correlated = [vec![1.0, 1.0], vec![1.0, 1.0]];
        assert_eq!(Cholesky::factor(&perfectly_correlated, 1e-4), Err(0.0));
    }

    #[test]
    fn log_sum_exp_is_stable() {
        let v = [1000.0, 1000.0];
        assert!((log_sum_exp(&v) - (1000.0 + 2.0_f64.ln())).abs() < 1e-9);
        assert_eq!(log_sum_exp(&[f64::NEG_INFINITY]), f64::NEG_INFINITY);
        assert!((log_sum_exp(&[0.0, f64::NEG_INFINITY]) - 0.0).abs() < f64::EPSILON);
    }
}
