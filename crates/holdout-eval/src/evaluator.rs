//! The Monte Carlo hold-out loop.

use holdout_io::BinaryLabel;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, info, instrument, warn};

use crate::classifier::Classifier;
use crate::data::LabeledSet;
use crate::error::{ClassifierError, EvalError};
use crate::split::{Split, test_size};
use crate::summary::{PairedSummary, Summary, error_rate};

/// What to do when a classifier fails to fit or predict during a trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Stop the run and return [`EvalError::TrialFailed`].
    Abort,
    /// Log the failure and record `NaN` for that classifier and trial.
    RecordNan,
}

/// Configuration for repeated random hold-out evaluation.
///
/// # Defaults
///
/// | Parameter        | Default |
/// |------------------|---------|
/// | `test_fraction`  | 0.2     |
/// | `seed`           | 42      |
/// | `failure_policy` | `Abort` |
/// | `confidence`     | 0.95    |
/// | `parallel`       | `false` |
#[derive(Debug, Clone)]
pub struct ResamplingConfig {
    n_trials: usize,
    test_fraction: f64,
    seed: u64,
    failure_policy: FailurePolicy,
    confidence: f64,
    parallel: bool,
}

impl ResamplingConfig {
    /// Default number of trials.
    pub const DEFAULT_N_TRIALS: usize = 50;

    /// # Errors
    ///
    /// Returns [`EvalError::InvalidTrialCount`] if `n_trials` is zero.
    pub fn new(n_trials: usize) -> Result<Self, EvalError> {
        if n_trials == 0 {
            return Err(EvalError::InvalidTrialCount { n_trials });
        }
        Ok(Self {
            n_trials,
            test_fraction: 0.2,
            seed: 42,
            failure_policy: FailurePolicy::Abort,
            confidence: 0.95,
            parallel: false,
        })
    }

    /// Set the fraction of observations held out per trial.
    #[must_use]
    pub fn with_test_fraction(mut self, test_fraction: f64) -> Self {
        self.test_fraction = test_fraction;
        self
    }

    /// Set the master seed from which per-trial seeds are drawn.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_failure_policy(mut self, failure_policy: FailurePolicy) -> Self {
        self.failure_policy = failure_policy;
        self
    }

    /// Set the confidence level of the summary intervals.
    #[must_use]
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    /// Run trials on the rayon pool. Results are identical either way.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.n_trials
    }

    #[must_use]
    pub fn test_fraction(&self) -> f64 {
        self.test_fraction
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn failure_policy(&self) -> FailurePolicy {
        self.failure_policy
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    #[must_use]
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    fn validate(&self) -> Result<(), EvalError> {
        if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            return Err(EvalError::InvalidTestFraction {
                fraction: self.test_fraction,
            });
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(EvalError::InvalidConfidence {
                confidence: self.confidence,
            });
        }
        Ok(())
    }

    /// Compare `first` and `second` over `n_trials` random hold-out splits.
    ///
    /// Every trial draws a fresh split and fits both classifiers on the same
    /// training part, so trial `k` of both series shares one test set.
    ///
    /// # Errors
    ///
    /// Preconditions checked before any trial runs:
    ///
    /// | Variant | Condition |
    /// |---|---|
    /// | [`EvalError::InvalidTestFraction`] | fraction not in (0, 1) |
    /// | [`EvalError::InvalidConfidence`] | confidence not in (0, 1) |
    /// | [`EvalError::EmptyDataset`] | `data` has no rows |
    /// | [`EvalError::EmptyTestSet`] | `ceil(fraction * N) == 0` |
    /// | [`EvalError::EmptyTrainingSet`] | the test set takes every row |
    /// | [`EvalError::MissingLevel`] | a label level never occurs |
    ///
    /// Under [`FailurePolicy::Abort`], the first classifier failure is
    /// returned as [`EvalError::TrialFailed`].
    #[instrument(skip_all, fields(
        n_trials = self.n_trials,
        n_samples = data.n_samples(),
        first = first.name(),
        second = second.name()
    ))]
    pub fn evaluate<A, B>(&self, data: &LabeledSet, first: &A, second: &B) -> Result<ResamplingResult, EvalError>
    where
        A: Classifier,
        B: Classifier,
    {
        self.validate()?;
        let n_samples = data.n_samples();
        if n_samples == 0 {
            return Err(EvalError::EmptyDataset);
        }
        let test_size = test_size(n_samples, self.test_fraction);
        if test_size == 0 {
            return Err(EvalError::EmptyTestSet {
                n_samples,
                fraction: self.test_fraction,
            });
        }
        if test_size >= n_samples {
            return Err(EvalError::EmptyTrainingSet { n_samples });
        }
        let counts = data.level_counts();
        if let Some(level) = BinaryLabel::LEVELS.into_iter().find(|l| counts[l.index()] == 0) {
            return Err(EvalError::MissingLevel {
                level: level.as_str(),
                n_samples,
            });
        }

        info!(
            n_samples,
            train_size = n_samples - test_size,
            test_size,
            parallel = self.parallel,
            "starting resampling"
        );

        let mut master = ChaCha8Rng::seed_from_u64(self.seed);
        let seeds: Vec<u64> = (0..self.n_trials).map(|_| master.r#gen()).collect();
        let run = |(trial, &seed): (usize, &u64)| self.run_trial(trial, seed, data, test_size, first, second);

        let trials = if self.parallel {
            seeds.par_iter().enumerate().map(run).collect::<Result<Vec<_>, _>>()?
        } else {
            seeds.iter().enumerate().map(run).collect::<Result<Vec<_>, _>>()?
        };

        let result = ResamplingResult {
            classifiers: [first.name().to_string(), second.name().to_string()],
            trials,
            n_samples,
            test_size,
            seed: self.seed,
            confidence: self.confidence,
        };
        let [failed_first, failed_second] = result.n_failed();
        info!(failed_first, failed_second, "resampling complete");
        Ok(result)
    }

    fn run_trial<A, B>(
        &self,
        trial: usize,
        seed: u64,
        data: &LabeledSet,
        test_size: usize,
        first: &A,
        second: &B,
    ) -> Result<TrialResult, EvalError>
    where
        A: Classifier,
        B: Classifier,
    {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let split = Split::draw(data.n_samples(), test_size, &mut rng)?;
        let first_seed: u64 = rng.r#gen();
        let second_seed: u64 = rng.r#gen();

        let train = data.subset(split.train())?;
        let test = data.subset(split.test())?;

        let first_error = self.score(trial, first, &train, &test, first_seed)?;
        let second_error = self.score(trial, second, &train, &test, second_seed)?;
        debug!(trial, first_error, second_error, "trial complete");

        let (_, test_indices) = split.into_parts();
        Ok(TrialResult {
            trial,
            test_indices,
            first_error,
            second_error,
        })
    }

    fn score<C: Classifier>(
        &self,
        trial: usize,
        classifier: &C,
        train: &LabeledSet,
        test: &LabeledSet,
        seed: u64,
    ) -> Result<f64, EvalError> {
        match fit_and_score(classifier, train, test, seed) {
            Ok(error) => Ok(error),
            Err(source) => match self.failure_policy {
                FailurePolicy::Abort => Err(EvalError::TrialFailed {
                    trial,
                    classifier: classifier.name().to_string(),
                    source,
                }),
                FailurePolicy::RecordNan => {
                    warn!(trial, classifier = classifier.name(), error = %source, "classifier failed, recording NaN");
                    Ok(f64::NAN)
                }
            },
        }
    }
}

fn fit_and_score<C: Classifier>(
    classifier: &C,
    train: &LabeledSet,
    test: &LabeledSet,
    seed: u64,
) -> Result<f64, ClassifierError> {
    let model = classifier.fit(train.features(), train.labels(), seed)?;
    let predicted = classifier.predict(&model, test.features())?;
    Ok(error_rate(&predicted, test.labels())?)
}

/// Outcome of one hold-out split.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialResult {
    /// Zero-based trial index.
    pub trial: usize,
    /// Held-out row indices, sorted ascending.
    pub test_indices: Vec<usize>,
    /// Test error of the first classifier; `NaN` if it failed.
    pub first_error: f64,
    /// Test error of the second classifier; `NaN` if it failed.
    pub second_error: f64,
}

/// Paired error series from [`ResamplingConfig::evaluate`].
#[derive(Debug, Clone)]
pub struct ResamplingResult {
    classifiers: [String; 2],
    trials: Vec<TrialResult>,
    n_samples: usize,
    test_size: usize,
    seed: u64,
    confidence: f64,
}

/// Summaries of both error series and of their difference.
#[derive(Debug, Clone, PartialEq)]
pub struct ResamplingSummary {
    pub first: Summary,
    pub second: Summary,
    pub paired: PairedSummary,
}

impl ResamplingResult {
    /// Names of the first and second classifier.
    #[must_use]
    pub fn classifier_names(&self) -> [&str; 2] {
        [&self.classifiers[0], &self.classifiers[1]]
    }

    /// Trials in index order.
    #[must_use]
    pub fn trials(&self) -> &[TrialResult] {
        &self.trials
    }

    #[must_use]
    pub fn first_errors(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.first_error).collect()
    }

    #[must_use]
    pub fn second_errors(&self) -> Vec<f64> {
        self.trials.iter().map(|t| t.second_error).collect()
    }

    /// Failed trials of the first and second classifier.
    #[must_use]
    pub fn n_failed(&self) -> [usize; 2] {
        let first = self.trials.iter().filter(|t| t.first_error.is_nan()).count();
        let second = self.trials.iter().filter(|t| t.second_error.is_nan()).count();
        [first, second]
    }

    #[must_use]
    pub fn n_trials(&self) -> usize {
        self.trials.len()
    }

    #[must_use]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[must_use]
    pub fn train_size(&self) -> usize {
        self.n_samples - self.test_size
    }

    #[must_use]
    pub fn test_size(&self) -> usize {
        self.test_size
    }

    #[must_use]
    pub fn seed(&self) -> u64 {
        self.seed
    }

    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Summaries at the configured confidence level.
    #[must_use]
    pub fn summarize(&self) -> ResamplingSummary {
        let first = self.first_errors();
        let second = self.second_errors();
        ResamplingSummary {
            first: Summary::compute(&first, self.confidence),
            second: Summary::compute(&second, self.confidence),
            paired: PairedSummary::compute(&first, &second, self.confidence),
        }
    }
}
