pub mod classifier_trait;
pub mod double;
pub mod factory;
pub mod single;

pub use classifier_trait::ThresholdModel;
pub use double::DoubleThresholdClassifier;
pub use single::SingleThresholdClassifier;

/// Inclusive upper bound of every threshold search range (pings per window
/// and expected positions per day are both capped at 60 upstream).
pub const MAX_THRESHOLD: u32 = 60;

/// Inclusive lower bound of the ping-count threshold search.
pub const MIN_PING_THRESHOLD: u32 = 1;

use std::path::Path;

use crate::error::ModelError;

/// The `.json` extension on model artifacts is enforced, not advisory.
pub(crate) fn require_json_extension(path: &Path) -> Result<(), ModelError> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(()),
        _ => Err(ModelError::Format(path.display().to_string())),
    }
}
