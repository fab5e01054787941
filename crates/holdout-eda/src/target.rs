//! Continuous target to binary label transformation.

use holdout_io::BinaryLabel;
use tracing::{info, instrument};

use crate::error::EdaError;

/// Cut point used to binarize a continuous target.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Threshold {
    /// The sample median of the target.
    #[default]
    Median,
    /// A fixed value.
    Value(f64),
}

/// Result of binarizing a target column.
#[derive(Debug, Clone)]
pub struct Binarized {
    /// One label per observation, in input order.
    pub labels: Vec<BinaryLabel>,
    /// The resolved threshold.
    pub threshold: f64,
    /// Number of `above` labels.
    pub n_above: usize,
    /// Number of `below` labels.
    pub n_below: usize,
}

/// Sample median; the mean of the two middle values for even lengths.
///
/// Returns `None` for an empty slice.
#[must_use]
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    })
}

/// Label each value `above` when it exceeds the threshold, `below` otherwise.
///
/// # Errors
///
/// | Variant | Condition |
/// |---|---|
/// | [`EdaError::EmptyTarget`] | `values` is empty |
/// | [`EdaError::MissingTarget`] | A value is missing |
/// | [`EdaError::NonFiniteThreshold`] | An explicit threshold is NaN or infinite |
/// | [`EdaError::SingleLevel`] | Every value falls on the same side |
#[instrument(skip(values), fields(n = values.len()))]
pub fn binarize(values: &[Option<f64>], threshold: Threshold) -> Result<Binarized, EdaError> {
    if values.is_empty() {
        return Err(EdaError::EmptyTarget);
    }
    let present: Vec<f64> = values
        .iter()
        .enumerate()
        .map(|(row_index, v)| v.ok_or(EdaError::MissingTarget { row_index }))
        .collect::<Result<_, _>>()?;

    let cut = match threshold {
        Threshold::Median => median(&present).ok_or(EdaError::EmptyTarget)?,
        Threshold::Value(t) if !t.is_finite() => {
            return Err(EdaError::NonFiniteThreshold { threshold: t });
        }
        Threshold::Value(t) => t,
    };

    let labels: Vec<BinaryLabel> = present
        .iter()
        .map(|&v| if v > cut { BinaryLabel::Above } else { BinaryLabel::Below })
        .collect();
    let n_above = labels.iter().filter(|&&l| l == BinaryLabel::Above).count();
    let n_below = labels.len() - n_above;

    if n_above == 0 || n_below == 0 {
        let level = if n_above == 0 { BinaryLabel::Below } else { BinaryLabel::Above };
        return Err(EdaError::SingleLevel {
            level: level.as_str(),
            n: labels.len(),
            threshold: cut,
        });
    }

    info!(threshold = cut, n_above, n_below, "target binarized");
    Ok(Binarized {
        labels,
        threshold: cut,
        n_above,
        n_below,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_split_is_balanced_for_distinct_values() {
        let values: Vec<f64> = (0..100).map(f64::from).collect();
        let b = binarize(&some(&values), Threshold::Median).unwrap();
        assert_eq!(b.n_above, 50);
        assert_eq!(b.n_below, 50);
        assert!((b.threshold - 49.5).abs() < f64::EPSILON);
    }

    #[test]
    fn ties_at_threshold_are_below() {
        let b = binarize(&some(&[1.0, 2.0, 2.0, 3.0]), Threshold::Value(2.0)).unwrap();
        assert_eq!(
            b.labels,
            vec![
                BinaryLabel::Below,
                BinaryLabel::Below,
                BinaryLabel::Below,
                BinaryLabel::Above
            ]
        );
    }

    #[test]
    fn missing_target_rejected() {
        let err = binarize(&[Some(1.0), None], Threshold::Median).unwrap_err();
        assert!(matches!(err, EdaError::MissingTarget { row_index: 1 }));
    }

    #[test]
    fn single_level_rejected() {
        let err = binarize(&some(&[5.0, 5.0, 5.0]), Threshold::Median).unwrap_err();
        assert!(matches!(err, EdaError::SingleLevel { level: "below", n: 3, .. }));

        let err = binarize(&some(&[1.0, 2.0]), Threshold::Value(0.0)).unwrap_err();
        assert!(matches!(err, EdaError::SingleLevel { level: "above", .. }));
    }

    #[test]
    fn empty_and_non_finite_rejected() {
        assert!(matches!(binarize(&[], Threshold::Median), Err(EdaError::EmptyTarget)));
        assert!(matches!(
            binarize(&some(&[1.0, 2.0]), Threshold::Value(f64::NAN)),
            Err(EdaError::NonFiniteThreshold { .. })
        ));
    }
}
