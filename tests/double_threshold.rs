//! Integration tests for the double-threshold classifier.

use gapwatch_classifiers::error::ModelError;
use gapwatch_classifiers::math::{Array1, Array2};
use gapwatch_classifiers::models::{DoubleThresholdClassifier, ThresholdModel};

fn matrix(rows: &[&[f64]]) -> Array2<f64> {
    let cols = rows[0].len();
    let data: Vec<f64> = rows.iter().flat_map(|r| r.iter().copied()).collect();
    Array2::from_shape_vec((rows.len(), cols), data).unwrap()
}

fn fitted_model() -> DoubleThresholdClassifier {
    // Column 0 = reception, columns 1-2 = ping counts. Disabling events
    // have good reception and heavy transmission right before the gap.
    let x = matrix(&[
        &[50.0, 30.0, 25.0],
        &[45.0, 40.0, 35.0],
        &[40.0, 3.0, 2.0],
        &[8.0, 30.0, 28.0],
        &[6.0, 2.0, 1.0],
    ]);
    let y = Array1::from_vec(vec![1u8, 1, 0, 0, 0]);
    let mut model = DoubleThresholdClassifier::new("rec_and_pings", 5);
    model.fit(&x, &y).unwrap();
    model
}

#[test]
fn both_thresholds_participate_in_the_and_test() {
    let model = fitted_model();
    assert_eq!(model.optimal_score().unwrap(), 1.0);

    let (j, k) = model.optimal_thresholds().unwrap();
    // Row with good reception but silent pings must fail on k; row with
    // heavy pings but dead reception must fail on j.
    let silent = matrix(&[&[50.0, 3.0, 2.0]]);
    let dead_zone = matrix(&[&[7.0, 40.0, 40.0]]);
    let disabling = matrix(&[&[50.0, 40.0, 40.0]]);
    assert_eq!(model.predict(&silent).unwrap().as_slice(), &[0]);
    assert_eq!(model.predict(&dead_zone).unwrap().as_slice(), &[0]);
    assert_eq!(model.predict(&disabling).unwrap().as_slice(), &[1]);
    // First perfect cell in the row-major scan: j=9 excludes the two
    // low-reception rows, k=3 excludes the silent-ping row.
    assert_eq!((j, k), (9, 3));
}

#[test]
fn reception_alone_can_separate() {
    let x = matrix(&[
        &[50.0, 10.0],
        &[50.0, 30.0],
        &[5.0, 30.0],
        &[5.0, 10.0],
    ]);
    let y = Array1::from_vec(vec![1u8, 1, 0, 0]);
    let mut model = DoubleThresholdClassifier::new("rec_and_pings", 0);
    model.fit(&x, &y).unwrap();
    assert_eq!(model.optimal_score().unwrap(), 1.0);
    assert_eq!(model.predict(&x).unwrap().as_slice(), y.as_slice());
}

#[test]
fn save_load_round_trip_is_bit_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("rec_and_pings.json");

    let original = fitted_model();
    original.save(&path).unwrap();

    let mut restored = DoubleThresholdClassifier::new("placeholder", 0);
    restored.load(&path).unwrap();

    assert_eq!(restored.name(), original.name());
    assert_eq!(restored.lowest_rec(), original.lowest_rec());
    assert_eq!(
        restored.optimal_thresholds().unwrap(),
        original.optimal_thresholds().unwrap()
    );
    assert_eq!(
        restored.optimal_score().unwrap(),
        original.optimal_score().unwrap()
    );
    assert_eq!(
        restored.test_rec_thresholds().unwrap(),
        original.test_rec_thresholds().unwrap()
    );
    assert_eq!(
        restored.test_ping_thresholds().unwrap(),
        original.test_ping_thresholds().unwrap()
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
    let path = dir.path().join("rec_and_pings.json");
    fitted_model().save(&path).unwrap();

    let raw = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    for key in [
        "model_name",
        "lowest_rec",
        "X_",
        "y_",
        "test_rec_thresholds_",
        "test_ping_thresholds_",
        "threshold_scores_",
        "j_",
        "k_",
        "optimal_score_",
    ] {
        assert!(value.get(key).is_some(), "artifact missing key '{}'", key);
    }
}

#[test]
fn predict_rejects_column_count_mismatch() {
    let model = fitted_model();
    let narrow = matrix(&[&[50.0, 30.0]]);
    assert!(matches!(
        model.predict(&narrow),
        Err(ModelError::Validation(_))
    ));
}

#[test]
fn reception_search_starts_above_lowest_rec() {
    let model = fitted_model();
    let rec = model.test_rec_thresholds().unwrap();
    assert_eq!(rec[0], model.lowest_rec() + 1);
}
