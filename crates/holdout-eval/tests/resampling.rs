//! End-to-end resampling runs on deterministic synthetic data.

use std::collections::BTreeSet;
use std::convert::Infallible;
use std::sync::Mutex;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use holdout_eval::{
    Classifier, EvalError, FailurePolicy, LabeledSet, MajorityClassifier, QdaClassifier, RandomForestClassifier,
    ResamplingConfig, Summary,
};
use holdout_io::{BinaryLabel, DesignMatrix};
use holdout_qda::QdaConfig;
use holdout_rf::RandomForestConfig;

fn standard_normal(rng: &mut impl Rng) -> f64 {
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Balanced classes; `Above` rows are shifted by 1.5 on the first feature.
/// With `constant_second`, the second feature is 0.0 for every `Above` row.
fn gaussian_set(n: usize, seed: u64, constant_second: bool) -> LabeledSet {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut rows = Vec::with_capacity(n);
    let mut labels = Vec::with_capacity(n);
    for i in 0..n {
        let label = if i % 2 == 0 { BinaryLabel::Above } else { BinaryLabel::Below };
        let shift = if label == BinaryLabel::Above { 1.5 } else { 0.0 };
        let x0 = shift + standard_normal(&mut rng);
        let x1 = standard_normal(&mut rng);
        let x1 = if constant_second && label == BinaryLabel::Above { 0.0 } else { x1 };
        rows.push(vec![x0, x1]);
        labels.push(label);
    }
    LabeledSet::new(
        DesignMatrix {
            feature_names: vec!["x0".into(), "x1".into()],
            rows,
        },
        labels,
    )
    .unwrap()
}

fn small_forest() -> RandomForestClassifier {
    RandomForestClassifier::new(RandomForestConfig::new(25).unwrap())
}

fn qda() -> QdaClassifier {
    QdaClassifier::new(QdaConfig::new(2).unwrap())
}

/// Records every test matrix it is asked to predict.
struct Recorder {
    seen: Mutex<Vec<Vec<Vec<f64>>>>,
}

impl Recorder {
    fn new() -> Self {
        Self { seen: Mutex::new(Vec::new()) }
    }
}

impl Classifier for Recorder {
    type Model = ();
    type Error = Infallible;

    fn name(&self) -> &str {
        "recorder"
    }

    fn fit(&self, _features: &[Vec<f64>], _labels: &[BinaryLabel], _seed: u64) -> Result<(), Infallible> {
        Ok(())
    }

    fn predict(&self, _model: &(), features: &[Vec<f64>]) -> Result<Vec<BinaryLabel>, Infallible> {
        self.seen.lock().unwrap().push(features.to_vec());
        Ok(vec![BinaryLabel::Above; features.len()])
    }
}

#[test]
fn hundred_rows_split_eighty_twenty() {
    let data = gaussian_set(100, 1, false);
    let result = ResamplingConfig::new(10)
        .unwrap()
        .evaluate(&data, &qda(), &small_forest())
        .unwrap();

    assert_eq!(result.n_trials(), 10);
    assert_eq!(result.test_size(), 20);
    assert_eq!(result.train_size(), 80);
    for trial in result.trials() {
        let unique: BTreeSet<usize> = trial.test_indices.iter().copied().collect();
        assert_eq!(unique.len(), 20);
        assert!(unique.iter().all(|&i| i < 100));
        let train_count = (0..100).filter(|i| !unique.contains(i)).count();
        assert_eq!(train_count + unique.len(), 100);
    }
}

#[test]
fn series_have_one_error_in_unit_interval_per_trial() {
    let data = gaussian_set(400, 2, false);
    let config = ResamplingConfig::new(8).unwrap();
    let forest = RandomForestClassifier::new(RandomForestConfig::new(100).unwrap());
    let result = config.evaluate(&data, &qda(), &forest).unwrap();
    for series in [result.first_errors(), result.second_errors()] {
        assert_eq!(series.len(), 8);
        assert!(series.iter().all(|e| (0.0..=1.0).contains(e)), "{series:?}");
    }
    assert_eq!(result.n_failed(), [0, 0]);

    // A 1.5 sd shift is learnable: both models beat the majority vote on
    // the same splits, and QDA approaches the Bayes error of about 0.23.
    let summary = result.summarize();
    let baseline = config
        .evaluate(&data, &MajorityClassifier, &MajorityClassifier)
        .unwrap()
        .summarize()
        .first
        .mean;
    assert!(summary.first.mean < 0.35, "qda mean error {}", summary.first.mean);
    assert!(
        summary.first.mean < baseline,
        "qda {} vs majority {baseline}",
        summary.first.mean
    );
    assert!(
        summary.second.mean < baseline,
        "forest {} vs majority {baseline}",
        summary.second.mean
    );
}

#[test]
fn fixed_seed_reproduces_the_run() {
    let data = gaussian_set(80, 3, false);
    let config = ResamplingConfig::new(6).unwrap().with_seed(7);
    let a = config.evaluate(&data, &qda(), &small_forest()).unwrap();
    let b = config.evaluate(&data, &qda(), &small_forest()).unwrap();
    assert_eq!(a.trials(), b.trials());

    let c = config
        .clone()
        .with_seed(8)
        .evaluate(&data, &qda(), &small_forest())
        .unwrap();
    assert_ne!(a.trials()[0].test_indices, c.trials()[0].test_indices);
}

#[test]
fn fresh_split_every_trial() {
    let data = gaussian_set(60, 4, false);
    let result = ResamplingConfig::new(5)
        .unwrap()
        .evaluate(&data, &MajorityClassifier, &MajorityClassifier)
        .unwrap();
    let distinct: BTreeSet<&Vec<usize>> = result.trials().iter().map(|t| &t.test_indices).collect();
    assert!(distinct.len() > 1);
}

#[test]
fn parallel_matches_sequential() {
    let data = gaussian_set(90, 5, false);
    let config = ResamplingConfig::new(12).unwrap().with_seed(11);
    let sequential = config.evaluate(&data, &qda(), &small_forest()).unwrap();
    let parallel = config
        .clone()
        .with_parallel(true)
        .evaluate(&data, &qda(), &small_forest())
        .unwrap();
    assert_eq!(sequential.trials(), parallel.trials());
}

#[test]
fn majority_baseline_is_near_chance_on_balanced_data() {
    let data = gaussian_set(1000, 6, false);
    let result = ResamplingConfig::new(100)
        .unwrap()
        .evaluate(&data, &MajorityClassifier, &MajorityClassifier)
        .unwrap();
    let errors = result.first_errors();
    // The training majority is the test minority, so no trial beats 0.5.
    assert!(errors.iter().all(|&e| e >= 0.5 - 1e-12));
    let mean = result.summarize().first.mean;
    assert!((mean - 0.5).abs() < 0.06, "mean majority error {mean}");
}

#[test]
fn single_trial_scores_both_classifiers_on_one_held_out_set() {
    let data = gaussian_set(50, 7, false);
    let (first, second) = (Recorder::new(), Recorder::new());
    let result = ResamplingConfig::new(1).unwrap().evaluate(&data, &first, &second).unwrap();

    assert_eq!(result.first_errors().len(), 1);
    assert_eq!(result.second_errors().len(), 1);

    let seen_first = first.seen.into_inner().unwrap();
    let seen_second = second.seen.into_inner().unwrap();
    assert_eq!(seen_first.len(), 1);
    assert_eq!(seen_first, seen_second);

    let expected: Vec<Vec<f64>> = result.trials()[0]
        .test_indices
        .iter()
        .map(|&i| data.features()[i].clone())
        .collect();
    assert_eq!(seen_first[0], expected);
    assert!((result.first_errors()[0] - result.second_errors()[0]).abs() < f64::EPSILON);
}

#[test]
fn qda_failure_aborts_by_default() {
    let data = gaussian_set(60, 8, true);
    let err = ResamplingConfig::new(3)
        .unwrap()
        .evaluate(&data, &qda(), &small_forest())
        .unwrap_err();
    assert!(
        matches!(&err, EvalError::TrialFailed { trial: 0, classifier, .. } if classifier == "qda"),
        "{err}"
    );
}

#[test]
fn qda_failure_recorded_as_nan() {
    let data = gaussian_set(60, 8, true);
    let result = ResamplingConfig::new(3)
        .unwrap()
        .with_failure_policy(FailurePolicy::RecordNan)
        .evaluate(&data, &qda(), &small_forest())
        .unwrap();
    assert_eq!(result.n_failed(), [3, 0]);
    assert!(result.second_errors().iter().all(|e| e.is_finite()));
}

#[test]
fn summary_is_computed_from_the_series_alone() {
    let data = gaussian_set(100, 9, false);
    let result = ResamplingConfig::new(15)
        .unwrap()
        .with_confidence(0.9)
        .evaluate(&data, &qda(), &small_forest())
        .unwrap();
    let summary = result.summarize();
    assert_eq!(summary.first, Summary::from_series(&result.first_errors(), 0.9).unwrap());
    assert_eq!(summary.second, Summary::from_series(&result.second_errors(), 0.9).unwrap());
    assert_eq!(
        summary.paired.first_better + summary.paired.second_better + summary.paired.ties,
        15
    );
    let lower = summary.first.ci_lower.unwrap();
    let upper = summary.first.ci_upper.unwrap();
    assert!(lower <= summary.first.mean && summary.first.mean <= upper);
}
