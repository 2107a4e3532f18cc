//! Integration tests for the single-threshold classifier: persistence
//! round-trips, artifact format enforcement, and the AND-test monotonicity
//! property.

use std::path::Path;

use serde_json::json;

use gapwatch_classifiers::error::ModelError;
use gapwatch_classifiers::math::{Array1, Array2};
use gapwatch_classifiers::models::{SingleThresholdClassifier, ThresholdModel};

fn matrix(rows: &[&[f64]]) -> Array2<f64> {
    let cols = rows[0].len();
    let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Array2::from_shape_vec((rows.len(), cols), data).unwrap()
}

fn fitted_model() -> SingleThresholdClassifier {
    let x = matrix(&[&[5.0], &[15.0], &[25.0], &[35.0]]);
    let y = Array1::from_vec(vec![0u8, 0, 1, 1]);
    let mut model = SingleThresholdClassifier::new("pings_single", 10);
    model.fit(&x, &y).unwrap();
    model
}

#[test]
fn save_load_round_trip_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pings_single.json");

    let original = fitted_model();
    original.save(&path).unwrap();

    let mut restored = SingleThresholdClassifier::new("placeholder", 0);
    restored.load(&path).unwrap();

    assert_eq!(restored.name(), original.name());
    assert_eq!(restored.lowest_rec(), original.lowest_rec());
    assert_eq!(
        restored.optimal_threshold().unwrap(),
        original.optimal_threshold().unwrap()
    );
    assert_eq!(
        restored.optimal_score().unwrap(),
        original.optimal_score().unwrap()
    );
    assert_eq!(
        restored.test_thresholds().unwrap(),
        original.test_thresholds().unwrap()
    );
    assert_eq!(
        restored.threshold_scores().unwrap(),
        original.threshold_scores().unwrap()
    );
    assert_eq!(
        restored.training_data().unwrap(),
        original.training_data().unwrap()
    );
}

#[test]
fn artifact_keys_match_the_persisted_contract() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pings_single.json");
    fitted_model().save(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in [
        "model_name",
        "lowest_rec",
        "X_",
        "y_",
        "test_thresholds_",
        "threshold_scores_",
        "k_",
        "optimal_score_",
    ] {
        assert!(value.get(key).is_some(), "artifact missing key '{}'", key);
    }
}

#[test]
fn non_json_extension_is_rejected() {
    let model = fitted_model();
    let err = model.save(Path::new("model.bin")).unwrap_err();
    assert!(matches!(err, ModelError::Format(_)));

    let mut fresh = SingleThresholdClassifier::new("pings_single", 0);
    let err = fresh.load(Path::new("model.csv")).unwrap_err();
    assert!(matches!(err, ModelError::Format(_)));
}

#[test]
fn load_overwrites_previous_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pings_single.json");
    fitted_model().save(&path).unwrap();

    // Start from a differently-fitted model and confirm the load wins.
    let x = matrix(&[&[1.0], &[59.0]]);
    let y = Array1::from_vec(vec![0u8, 1]);
    let mut other = SingleThresholdClassifier::new("other", 3);
    other.fit(&x, &y).unwrap();
    assert_ne!(other.optimal_threshold().unwrap(), 16);

    other.load(&path).unwrap();
    assert_eq!(other.name(), "pings_single");
    assert_eq!(other.lowest_rec(), 10);
    assert_eq!(other.optimal_threshold().unwrap(), 16);
}

/// Forge an artifact with a chosen threshold so the monotonicity property
/// can be checked across k values through the public load/predict surface.
fn model_with_threshold(dir: &Path, k: u32) -> SingleThresholdClassifier {
    let artifact = json!({
        "model_name": "forged",
        "lowest_rec": 0,
        "X_": [[1.0], [2.0]],
        "y_": [0, 1],
        "test_thresholds_": (1..=60).collect::<Vec<u32>>(),
        "threshold_scores_": vec![0.0; 60],
        "k_": k,
        "optimal_score_": 0.0,
    });
    let path = dir.join(format!("forged_{}.json", k));
    std::fs::write(&path, artifact.to_string()).unwrap();
    let mut model = SingleThresholdClassifier::new("forged", 0);
    model.load(&path).unwrap();
    model
}

#[test]
fn predicted_positives_never_increase_with_k() {
    let dir = tempfile::tempdir().unwrap();
    let x = matrix(&[&[3.0], &[17.0], &[29.0], &[44.0], &[60.0]]);

    let mut previous_positives = usize::MAX;
    for k in 1..=60 {
        let model = model_with_threshold(dir.path(), k);
        let preds = model.predict(&x).unwrap();
        let positives = preds.iter().filter(|&&p| p == 1).count();
        assert!(
            positives <= previous_positives,
            "raising k to {} grew the positive count",
            k
        );
        previous_positives = positives;
    }
}

#[test]
fn positive_at_high_k_implies_positive_at_lower_k() {
    let dir = tempfile::tempdir().unwrap();
    let x = matrix(&[&[42.0]]);
    let strict = model_with_threshold(dir.path(), 40);
    let loose = model_with_threshold(dir.path(), 12);
    assert_eq!(strict.predict(&x).unwrap().as_slice(), &[1]);
    assert_eq!(loose.predict(&x).unwrap().as_slice(), &[1]);
}
