//! End-to-end integration tests: CSV -> dataset -> subset/design matrix -> JSON.

use std::fs;
use std::path::Path;

use holdout_io::{Column, DatasetReader, ExperimentName, MissingEntry, ExploreArtifact, ResultWriter};
use tempfile::TempDir;

/// Path to the test fixture directory.
fn fixture_path(name: &str) -> std::path::PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

#[test]
fn fixture_loads_with_inferred_types() {
    let ds = DatasetReader::new(&fixture_path("airquality_12.csv"))
        .read()
        .expect("fixture should parse");

    assert_eq!(ds.n_rows(), 12);
    assert_eq!(ds.column_names(), &["ozone", "solar", "wind", "temp", "region"]);
    assert_eq!(ds.column("ozone").unwrap().n_missing(), 2);
    assert_eq!(ds.column("solar").unwrap().n_missing(), 3);
    assert_eq!(ds.column("wind").unwrap().n_missing(), 0);
    match ds.column("region").unwrap() {
        Column::Categorical { levels, .. } => assert_eq!(levels, &["north", "south", "east"]),
        other => panic!("region should be categorical, got {other:?}"),
    }
}

#[test]
fn complete_case_design_matrix() {
    let ds = DatasetReader::new(&fixture_path("airquality_12.csv"))
        .read()
        .unwrap();
    let used: Vec<String> = ["ozone", "solar", "wind", "region"]
        .iter()
        .map(|s| s.to_string())
        .collect();

    let rows = ds.complete_rows(&used).unwrap();
    assert_eq!(rows.len(), 8);

    let complete = ds.subset(&rows).unwrap();
    let dm = complete
        .design_matrix(&["solar".to_string(), "wind".to_string(), "region".to_string()])
        .unwrap();
    assert_eq!(dm.rows.len(), 8);
    assert_eq!(dm.feature_names, vec!["solar", "wind", "regionsouth", "regioneast"]);
    for row in &dm.rows {
        assert_eq!(row.len(), 4);
        let dummies: f64 = row[2..].iter().sum();
        assert!(dummies <= 1.0);
    }
}

#[test]
fn missing_counts_round_trip_through_json() {
    let ds = DatasetReader::new(&fixture_path("airquality_12.csv"))
        .read()
        .unwrap();
    let missing: Vec<MissingEntry> = ds
        .columns()
        .map(|(name, col)| MissingEntry {
            column: name.to_string(),
            n_missing: col.n_missing(),
            fraction: col.n_missing() as f64 / ds.n_rows() as f64,
        })
        .collect();

    let dir = TempDir::new().unwrap();
    let writer = ResultWriter::new(dir.path(), ExperimentName::new("aq".into()).unwrap()).unwrap();
    let path = writer
        .write_explore(&ExploreArtifact {
            experiment: "aq".into(),
            n_rows: ds.n_rows(),
            n_columns: ds.n_columns(),
            target: "ozone".into(),
            missing,
            variance: vec![],
            correlation_cutoff: 0.9,
            correlation_columns: vec![],
            correlation_matrix: vec![],
            highly_correlated: vec![],
        })
        .unwrap();

    let content: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    let entries = content["missing"].as_array().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[1]["column"], "solar");
    assert_eq!(entries[1]["n_missing"], 3);
}
