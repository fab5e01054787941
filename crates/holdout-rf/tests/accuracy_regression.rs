//! Accuracy regression tests on a deterministic two-class problem.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use holdout_rf::{MaxFeatures, OobMode, RandomForestConfig, SplitCriterion};

/// 400 samples, 8 features; features 0 and 1 shift by class, the rest are noise.
fn make_binary(seed: u64) -> (Vec<Vec<f64>>, Vec<usize>, Vec<String>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(400);
    let mut labels = Vec::with_capacity(400);
    for i in 0..400 {
        let class = i % 2;
        labels.push(class);
        let row: Vec<f64> = (0..8)
            .map(|f| {
                let shift = if f < 2 { class as f64 * 1.5 } else { 0.0 };
                shift + rng.r#gen::<f64>() * 2.0
            })
            .collect();
        features.push(row);
    }
    let names = (0..8).map(|f| format!("x{f}")).collect();
    (features, labels, names)
}

fn holdout_error(config: &RandomForestConfig) -> f64 {
    let (features, labels, names) = make_binary(42);
    let (train_x, test_x) = features.split_at(300);
    let (train_y, test_y) = labels.split_at(300);
    let result = config.fit(train_x, train_y, &names).unwrap();
    let predicted = result.forest().predict_batch(test_x).unwrap();
    let wrong = predicted.iter().zip(test_y).filter(|(p, y)| p != y).count();
    wrong as f64 / test_y.len() as f64
}

#[test]
fn default_forest_generalizes() {
    let config = RandomForestConfig::new(100).unwrap();
    let error = holdout_error(&config);
    assert!(error < 0.2, "held-out error {error} >= 0.2");
}

#[test]
fn entropy_criterion_generalizes() {
    let config = RandomForestConfig::new(100)
        .unwrap()
        .with_criterion(SplitCriterion::Entropy);
    let error = holdout_error(&config);
    assert!(error < 0.2, "held-out error {error} >= 0.2");
}

#[test]
fn oob_error_tracks_holdout_error() {
    let (features, labels, names) = make_binary(42);
    let result = RandomForestConfig::new(100)
        .unwrap()
        .with_oob_mode(OobMode::Enabled)
        .fit(&features, &labels, &names)
        .unwrap();
    let oob = result.oob_score().unwrap();
    assert!(oob.error_rate < 0.25, "oob error {}", oob.error_rate);
    assert_eq!(oob.confusion.len(), 2);
}

#[test]
fn informative_features_rank_highest() {
    let (features, labels, names) = make_binary(7);
    let result = RandomForestConfig::new(100)
        .unwrap()
        .fit(&features, &labels, &names)
        .unwrap();
    let top: Vec<&str> = result.importances()[..2].iter().map(|f| f.name.as_str()).collect();
    assert!(top.contains(&"x0"), "top = {top:?}");
    assert!(top.contains(&"x1"), "top = {top:?}");
}

#[test]
fn shallow_trees_still_beat_chance() {
    let config = RandomForestConfig::new(50)
        .unwrap()
        .with_max_depth(Some(2))
        .with_max_features(MaxFeatures::All);
    let error = holdout_error(&config);
    assert!(error < 0.35, "held-out error {error}");
}
