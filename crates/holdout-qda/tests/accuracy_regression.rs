//! Accuracy regression tests on deterministic Gaussian classes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use holdout_qda::{QdaConfig, QdaError};

fn standard_normal(rng: &mut impl Rng) -> f64 {
    // Box-Muller
    let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
    let u2: f64 = rng.r#gen();
    (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
}

/// Class 0 tight around the origin, class 1 wide around the origin:
/// equal means, so only a quadratic boundary separates them.
fn nested_classes(n_per_class: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::new();
    let mut labels = Vec::new();
    for i in 0..2 * n_per_class {
        let class = i % 2;
        let scale = if class == 0 { 0.5 } else { 3.0 };
        features.push(vec![
            scale * standard_normal(&mut rng),
            scale * standard_normal(&mut rng),
            standard_normal(&mut rng),
        ]);
        labels.push(class);
    }
    (features, labels)
}

#[test]
fn quadratic_boundary_is_learned() {
    let (train_x, train_y) = nested_classes(150, 42);
    let (test_x, test_y) = nested_classes(100, 43);
    let model = QdaConfig::new(2).unwrap().fit(&train_x, &train_y).unwrap();
    let predicted = model.predict_batch(&test_x).unwrap();
    let wrong = predicted.iter().zip(&test_y).filter(|(p, y)| p != y).count();
    let error = wrong as f64 / test_y.len() as f64;
    assert!(error < 0.15, "held-out error {error}");
}

#[test]
fn estimated_priors_follow_class_sizes() {
    let (mut features, mut labels) = nested_classes(50, 1);
    let (extra_x, _) = nested_classes(25, 2);
    for row in extra_x {
        features.push(row);
        labels.push(0);
    }
    let model = QdaConfig::new(2).unwrap().fit(&features, &labels).unwrap();
    let priors: Vec<f64> = model.classes().iter().map(|c| c.prior()).collect();
    assert!((priors[0] - 100.0 / 150.0).abs() < 1e-12);
    assert!((priors[1] - 50.0 / 150.0).abs() < 1e-12);
}

#[test]
fn duplicated_column_is_rank_deficient() {
    let (features, labels) = nested_classes(40, 3);
    let duplicated: Vec<Vec<f64>> = features
        .iter()
        .map(|row| vec![row[0], row[1], row[0]])
        .collect();
    let err = QdaConfig::new(2).unwrap().fit(&duplicated, &labels).unwrap_err();
    assert!(matches!(err, QdaError::RankDeficient { class: 0, .. }));
}
