use crate::config::{CandidateSpec, ModelKind};
use crate::models::classifier_trait::ThresholdModel;
use crate::models::double::DoubleThresholdClassifier;
use crate::models::single::SingleThresholdClassifier;

/// Build a fresh, unfitted boxed model for a candidate family.
///
/// The cross-validation harness calls this once per fold so no fitted state
/// ever leaks between folds.
pub fn build_model(spec: &CandidateSpec, lowest_rec: u32) -> Box<dyn ThresholdModel> {
    match spec.kind {
        ModelKind::SingleThreshold => {
            Box::new(SingleThresholdClassifier::new(&spec.name, lowest_rec))
        }
        ModelKind::DoubleThreshold => {
            Box::new(DoubleThresholdClassifier::new(&spec.name, lowest_rec))
        }
    }
}
