//! Error rates and normal-approximation summaries of error series.

use holdout_io::BinaryLabel;

use crate::error::EvalError;

/// Fraction of positions where `predicted` and `truth` disagree.
///
/// Returns `NaN` for empty inputs.
///
/// # Errors
///
/// Returns [`EvalError::PredictionCountMismatch`] when the lengths differ.
pub fn error_rate(predicted: &[BinaryLabel], truth: &[BinaryLabel]) -> Result<f64, EvalError> {
    if predicted.len() != truth.len() {
        return Err(EvalError::PredictionCountMismatch {
            n_predicted: predicted.len(),
            n_truth: truth.len(),
        });
    }
    if truth.is_empty() {
        return Ok(f64::NAN);
    }
    let wrong = predicted.iter().zip(truth).filter(|(p, t)| p != t).count();
    Ok(wrong as f64 / truth.len() as f64)
}

/// Standard normal quantile function Φ⁻¹(p) for p in (0, 1).
///
/// Rational approximation by P. J. Acklam, relative error below 1.2e-9.
/// Returns `NaN` outside (0, 1).
#[must_use]
pub fn inverse_normal_cdf(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_690e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if !(p > 0.0 && p < 1.0) {
        return f64::NAN;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

/// Mean, sample standard deviation and two-sided confidence interval of a
/// series.
///
/// Non-finite entries (failed trials) are counted in `n_failed` and
/// excluded. `std_dev` and the interval are `None` with fewer than two
/// finite entries; `mean` is `NaN` with none.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub n_trials: usize,
    pub n_failed: usize,
    pub mean: f64,
    pub std_dev: Option<f64>,
    pub ci_lower: Option<f64>,
    pub ci_upper: Option<f64>,
    pub confidence: f64,
}

impl Summary {
    /// Summarize a series at the given confidence level.
    ///
    /// The interval is `mean ± z · sd / sqrt(n)` with
    /// `z = Φ⁻¹((1 + confidence) / 2)`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::InvalidConfidence`] unless `confidence` is in (0, 1).
    pub fn from_series(series: &[f64], confidence: f64) -> Result<Self, EvalError> {
        check_confidence(confidence)?;
        Ok(Self::compute(series, confidence))
    }

    pub(crate) fn compute(series: &[f64], confidence: f64) -> Self {
        let values: Vec<f64> = series.iter().copied().filter(|v| v.is_finite()).collect();
        let n = values.len();
        let n_failed = series.len() - n;
        let mean = if n == 0 {
            f64::NAN
        } else {
            values.iter().sum::<f64>() / n as f64
        };

        let std_dev = (n >= 2).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });
        let half_width = std_dev.map(|sd| {
            let z = inverse_normal_cdf((1.0 + confidence) / 2.0);
            z * sd / (n as f64).sqrt()
        });

        Self {
            n_trials: series.len(),
            n_failed,
            mean,
            std_dev,
            ci_lower: half_width.map(|h| mean - h),
            ci_upper: half_width.map(|h| mean + h),
            confidence,
        }
    }
}

/// Comparison of two classifiers trial by trial.
///
/// Trials where either error is non-finite are left out of the
/// difference series and the win counts.
#[derive(Debug, Clone, PartialEq)]
pub struct PairedSummary {
    /// Summary of `first − second` per trial.
    pub difference: Summary,
    /// Trials where the first classifier had the lower error.
    pub first_better: usize,
    /// Trials where the second classifier had the lower error.
    pub second_better: usize,
    /// Trials with equal errors.
    pub ties: usize,
}

impl PairedSummary {
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::SeriesLengthMismatch`] | The series differ in length |
    /// | [`EvalError::InvalidConfidence`] | `confidence` not in (0, 1) |
    pub fn from_series(first: &[f64], second: &[f64], confidence: f64) -> Result<Self, EvalError> {
        if first.len() != second.len() {
            return Err(EvalError::SeriesLengthMismatch {
                first: first.len(),
                second: second.len(),
            });
        }
        check_confidence(confidence)?;
        Ok(Self::compute(first, second, confidence))
    }

    pub(crate) fn compute(first: &[f64], second: &[f64], confidence: f64) -> Self {
        let differences: Vec<f64> = first.iter().zip(second).map(|(a, b)| a - b).collect();
        let (mut first_better, mut second_better, mut ties) = (0, 0, 0);
        for d in differences.iter().filter(|d| d.is_finite()) {
            match d.total_cmp(&0.0) {
                std::cmp::Ordering::Less => first_better += 1,
                std::cmp::Ordering::Greater => second_better += 1,
                std::cmp::Ordering::Equal => ties += 1,
            }
        }
        Self {
            difference: Summary::compute(&differences, confidence),
            first_better,
            second_better,
            ties,
        }
    }
}

fn check_confidence(confidence: f64) -> Result<(), EvalError> {
    if confidence > 0.0 && confidence < 1.0 {
        Ok(())
    } else {
        Err(EvalError::InvalidConfidence { confidence })
    }
}
