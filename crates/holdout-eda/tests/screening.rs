//! Screening regression tests on a deterministic synthetic table.
//!
//! The table has two informative covariates, one near-duplicate of the
//! first, one near-constant indicator, and a continuous target.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use holdout_eda::{
    CorrelationMatrix, NzvConfig, Threshold, binarize, find_correlation, missing_summary,
    near_zero_variance,
};
use holdout_io::{Column, Dataset};

fn make_table(n: usize) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut x1 = Vec::with_capacity(n);
    let mut x1_copy = Vec::with_capacity(n);
    let mut x2 = Vec::with_capacity(n);
    let mut flag = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let a: f64 = rng.r#gen::<f64>() * 10.0;
        let b: f64 = rng.r#gen::<f64>() * 10.0;
        x1.push(Some(a));
        x1_copy.push(Some(a + rng.r#gen::<f64>() * 0.01));
        x2.push(if i % 25 == 3 { None } else { Some(b) });
        flag.push(Some(if i == 0 { 1.0 } else { 0.0 }));
        y.push(Some(a + 0.5 * b + rng.r#gen::<f64>()));
    }
    Dataset::new(
        vec!["x1".into(), "x1_copy".into(), "x2".into(), "flag".into(), "y".into()],
        vec![
            Column::Numeric(x1),
            Column::Numeric(x1_copy),
            Column::Numeric(x2),
            Column::Numeric(flag),
            Column::Numeric(y),
        ],
    )
    .unwrap()
}

#[test]
fn missing_values_are_located() {
    let ds = make_table(100);
    let summary = missing_summary(&ds);
    let x2 = summary.iter().find(|m| m.column == "x2").unwrap();
    assert_eq!(x2.n_missing, 4);
    assert!(summary.iter().filter(|m| m.column != "x2").all(|m| m.n_missing == 0));
}

#[test]
fn near_constant_indicator_is_flagged() {
    let ds = make_table(100);
    let diagnostics = near_zero_variance(&ds, &NzvConfig::new()).unwrap();
    let flagged: Vec<&str> = diagnostics
        .iter()
        .filter(|d| d.nzv)
        .map(|d| d.column.as_str())
        .collect();
    assert_eq!(flagged, vec!["flag"]);
}

#[test]
fn near_duplicate_covariate_is_filtered() {
    let ds = make_table(100);
    let covariates: Vec<String> = ["x1", "x1_copy", "x2"].iter().map(|s| s.to_string()).collect();
    let matrix = CorrelationMatrix::pearson(&ds, &covariates).unwrap();
    assert!(matrix.get(0, 1) > 0.99, "r = {}", matrix.get(0, 1));

    let dropped = find_correlation(&matrix, 0.9).unwrap();
    assert_eq!(dropped.len(), 1, "dropped = {dropped:?}");
    assert!(dropped[0] == "x1" || dropped[0] == "x1_copy");
}

#[test]
fn target_median_split_is_balanced() {
    let ds = make_table(100);
    let b = binarize(ds.numeric_column("y").unwrap(), Threshold::Median).unwrap();
    assert_eq!(b.labels.len(), 100);
    assert_eq!(b.n_above, 50);
    assert_eq!(b.n_below, 50);
}
