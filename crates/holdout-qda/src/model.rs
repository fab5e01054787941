//! Class densities, fitting, and posterior prediction.

use tracing::{debug, info, instrument};

use crate::config::QdaConfig;
use crate::error::QdaError;
use crate::linalg::{Cholesky, log_sum_exp};

/// Gaussian density estimate for one class.
///
/// The covariance is held as per-feature standard deviations `D` and a
/// Cholesky factor of the correlation matrix `R`, so `Σ = D R D`.
#[derive(Debug, Clone)]
pub struct ClassDensity {
    prior: f64,
    n_samples: usize,
    mean: Vec<f64>,
    std_dev: Vec<f64>,
    correlation: Cholesky,
    log_det: f64,
}

impl ClassDensity {
    #[must_use]
    pub fn prior(&self) -> f64 {
        self.prior
    }

    /// Training samples in this class.
    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[must_use]
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Unbiased within-class standard deviation of each feature.
    #[must_use]
    pub fn std_dev(&self) -> &[f64] {
        &self.std_dev
    }

    /// `log |Σ_k|`.
    #[must_use]
    pub fn log_det(&self) -> f64 {
        self.log_det
    }

    /// Squared Mahalanobis distance from the class mean.
    #[must_use]
    pub fn mahalanobis(&self, sample: &[f64]) -> f64 {
        let z: Vec<f64> = sample
            .iter()
            .zip(&self.mean)
            .zip(&self.std_dev)
            .map(|((x, m), s)| (x - m) / s)
            .collect();
        self.correlation.solve_lower(&z).iter().map(|w| w * w).sum()
    }

    /// `log π_k − ½ log|Σ_k| − ½ d²_k(x)`.
    #[must_use]
    pub fn discriminant(&self, sample: &[f64]) -> f64 {
        self.prior.ln() - 0.5 * self.log_det - 0.5 * self.mahalanobis(sample)
    }
}

/// A fitted QDA classifier.
#[derive(Debug, Clone)]
pub struct QdaModel {
    classes: Vec<ClassDensity>,
    n_features: usize,
}

impl QdaModel {
    /// Discriminant score of each class for one sample.
    ///
    /// # Errors
    ///
    /// Returns [`QdaError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn discriminants(&self, sample: &[f64]) -> Result<Vec<f64>, QdaError> {
        if sample.len() != self.n_features {
            return Err(QdaError::PredictionFeatureMismatch {
                expected: self.n_features,
                got: sample.len(),
            });
        }
        Ok(self.classes.iter().map(|c| c.discriminant(sample)).collect())
    }

    /// Class with the largest discriminant; lowest index on ties.
    ///
    /// # Errors
    ///
    /// Returns [`QdaError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn predict(&self, sample: &[f64]) -> Result<usize, QdaError> {
        let scores = self.discriminants(sample)?;
        let mut best = 0;
        for (class, &score) in scores.iter().enumerate() {
            if score > scores[best] {
                best = class;
            }
        }
        Ok(best)
    }

    /// Posterior class probabilities for one sample.
    ///
    /// # Errors
    ///
    /// Returns [`QdaError::PredictionFeatureMismatch`] on a width mismatch.
    pub fn predict_proba(&self, sample: &[f64]) -> Result<Vec<f64>, QdaError> {
        let scores = self.discriminants(sample)?;
        let norm = log_sum_exp(&scores);
        Ok(scores.iter().map(|s| (s - norm).exp()).collect())
    }

    /// # Errors
    ///
    /// Returns [`QdaError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn predict_batch(&self, features: &[Vec<f64>]) -> Result<Vec<usize>, QdaError> {
        features.iter().map(|row| self.predict(row)).collect()
    }

    /// # Errors
    ///
    /// Returns [`QdaError::PredictionFeatureMismatch`] if any row has the wrong width.
    pub fn predict_proba_batch(&self, features: &[Vec<f64>]) -> Result<Vec<Vec<f64>>, QdaError> {
        features.iter().map(|row| self.predict_proba(row)).collect()
    }

    #[must_use]
    pub fn classes(&self) -> &[ClassDensity] {
        &self.classes
    }

    #[must_use]
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    #[must_use]
    pub fn n_features(&self) -> usize {
        self.n_features
    }
}

fn validate(config: &QdaConfig, features: &[Vec<f64>], labels: &[usize]) -> Result<usize, QdaError> {
    let Some(first) = features.first() else {
        return Err(QdaError::EmptyDataset);
    };
    let n_features = first.len();
    if n_features == 0 {
        return Err(QdaError::ZeroFeatures);
    }
    if labels.len() != features.len() {
        return Err(QdaError::LabelCountMismatch {
            n_samples: features.len(),
            n_labels: labels.len(),
        });
    }
    for (sample_index, (row, &label)) in features.iter().zip(labels).enumerate() {
        if row.len() != n_features {
            return Err(QdaError::FeatureCountMismatch {
                expected: n_features,
                got: row.len(),
                sample_index,
            });
        }
        if let Some(feature_index) = row.iter().position(|v| !v.is_finite()) {
            return Err(QdaError::NonFiniteValue {
                sample_index,
                feature_index,
            });
        }
        if label >= config.n_classes {
            return Err(QdaError::LabelOutOfRange {
                label,
                n_classes: config.n_classes,
                sample_index,
            });
        }
    }
    Ok(n_features)
}

#[instrument(skip_all, fields(n_samples = features.len(), n_classes = config.n_classes))]
pub(crate) fn fit(config: &QdaConfig, features: &[Vec<f64>], labels: &[usize]) -> Result<QdaModel, QdaError> {
    let p = validate(config, features, labels)?;
    let n = features.len();

    let mut members: Vec<Vec<&[f64]>> = vec![Vec::new(); config.n_classes];
    for (row, &label) in features.iter().zip(labels) {
        members[label].push(row.as_slice());
    }
    if let Some((class, rows)) = members.iter().enumerate().find(|(_, rows)| rows.len() <= p) {
        return Err(QdaError::GroupTooSmall {
            class,
            n_samples: rows.len(),
            n_features: p,
        });
    }

    let classes = members
        .iter()
        .enumerate()
        .map(|(class, rows)| -> Result<ClassDensity, QdaError> {
            let prior = match &config.priors {
                Some(priors) => priors[class],
                None => rows.len() as f64 / n as f64,
            };
            let density = estimate(class, rows, prior, config.tol)?;
            debug!(
                class,
                n_samples = rows.len(),
                prior,
                log_det = density.log_det,
                min_pivot = density.correlation.min_pivot(),
                "class density estimated"
            );
            Ok(density)
        })
        .collect::<Result<Vec<_>, QdaError>>()?;

    info!(n_features = p, "qda fitted");
    Ok(QdaModel {
        classes,
        n_features: p,
    })
}

fn estimate(class: usize, rows: &[&[f64]], prior: f64, tol: f64) -> Result<ClassDensity, QdaError> {
    let p = rows[0].len();
    let n_k = rows.len() as f64;

    let mut mean = vec![0.0; p];
    for row in rows {
        for (m, v) in mean.iter_mut().zip(row.iter()) {
            *m += v;
        }
    }
    mean.iter_mut().for_each(|m| *m /= n_k);

    let mut cov = vec![vec![0.0; p]; p];
    for row in rows {
        for i in 0..p {
            let di = row[i] - mean[i];
            for j in 0..=i {
                cov[i][j] += di * (row[j] - mean[j]);
            }
        }
    }
    for i in 0..p {
        for j in 0..=i {
            cov[i][j] /= n_k - 1.0;
            cov[j][i] = cov[i][j];
        }
    }

    let std_dev: Vec<f64> = (0..p).map(|i| cov[i][i].sqrt()).collect();
    if let Some(feature) = std_dev.iter().position(|&s| s <= 0.0 || !s.is_finite()) {
        return Err(QdaError::ZeroVariance { class, feature });
    }

    let corr: Vec<Vec<f64>> = (0..p)
        .map(|i| (0..p).map(|j| cov[i][j] / (std_dev[i] * std_dev[j])).collect())
        .collect();
    let correlation =
        Cholesky::factor(&corr, tol).map_err(|pivot| QdaError::RankDeficient { class, pivot, tol })?;

    let log_det = 2.0 * std_dev.iter().map(|s| s.ln()).sum::<f64>() + correlation.log_det();

    Ok(ClassDensity {
        prior,
        n_samples: rows.len(),
        mean,
        std_dev,
        correlation,
        log_det,
    })
}
