//! Random train/test partitions of observation indices.

use rand::Rng;
use rand::seq::index;

use crate::error::EvalError;

/// Number of held-out observations: `ceil(fraction * n_samples)`.
///
/// The product is nudged down by 1e-9 before rounding up, so fractions
/// such as 0.3 of 10 give 3 rather than 4.
#[must_use]
pub fn test_size(n_samples: usize, fraction: f64) -> usize {
    let raw = (fraction * n_samples as f64 - 1e-9).ceil();
    if raw <= 0.0 { 0 } else { raw as usize }
}

/// A partition of `0..n` into disjoint train and test index sets.
///
/// Both sets are sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl Split {
    /// Draw `test_size` indices uniformly without replacement as the test
    /// set; the rest form the training set.
    ///
    /// # Errors
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::EmptyDataset`] | `n == 0` |
    /// | [`EvalError::EmptyTestSet`] | `test_size == 0` |
    /// | [`EvalError::EmptyTrainingSet`] | `test_size >= n` |
    pub fn draw(n: usize, test_size: usize, rng: &mut impl Rng) -> Result<Self, EvalError> {
        if n == 0 {
            return Err(EvalError::EmptyDataset);
        }
        if test_size == 0 {
            return Err(EvalError::EmptyTestSet {
                n_samples: n,
                fraction: 0.0,
            });
        }
        if test_size >= n {
            return Err(EvalError::EmptyTrainingSet { n_samples: n });
        }

        let mut in_test = vec![false; n];
        for i in index::sample(rng, n, test_size) {
            in_test[i] = true;
        }
        let (test, train): (Vec<usize>, Vec<usize>) = (0..n).partition(|&i| in_test[i]);
        Ok(Self { train, test })
    }

    #[must_use]
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    #[must_use]
    pub fn test(&self) -> &[usize] {
        &self.test
    }

    /// Consume the split, returning `(train, test)`.
    #[must_use]
    pub fn into_parts(self) -> (Vec<usize>, Vec<usize>) {
        (self.train, self.test)
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn test_size_rounds_up() {
        assert_eq!(test_size(100, 0.2), 20);
        assert_eq!(test_size(111, 0.2), 23);
        assert_eq!(test_size(10, 0.3), 3);
        assert_eq!(test_size(4, 0.2), 1);
        assert_eq!(test_size(0, 0.2), 0);
    }

    #[test]
    fn partition_is_disjoint_and_complete() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let split = Split::draw(50, 10, &mut rng).unwrap();
        assert_eq!(split.test().len(), 10);
        assert_eq!(split.train().len(), 40);
        let mut all: Vec<usize> = split.train().iter().chain(split.test()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..50).collect::<Vec<_>>());
        assert!(split.test().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn fresh_draws_differ() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let a = Split::draw(100, 20, &mut rng).unwrap();
        let b = Split::draw(100, 20, &mut rng).unwrap();
        assert_ne!(a.test(), b.test());
    }

    #[test]
    fn same_seed_same_split() {
        let a = Split::draw(30, 6, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        let b = Split::draw(30, 6, &mut ChaCha8Rng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_sizes_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(Split::draw(0, 0, &mut rng), Err(EvalError::EmptyDataset)));
        assert!(matches!(Split::draw(5, 0, &mut rng), Err(EvalError::EmptyTestSet { .. })));
        assert!(matches!(Split::draw(5, 5, &mut rng), Err(EvalError::EmptyTrainingSet { .. })));
    }
}
