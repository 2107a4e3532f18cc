use std::path::Path;

use crate::error::ModelError;
use crate::math::{Array1, Array2};

/// Contract shared by the threshold models so the cross-validation harness
/// and the selection driver can treat the families uniformly. Mirrors the
/// fit/predict/save/load surface the downstream figure generation consumes.
pub trait ThresholdModel: Send {
    /// Fit the model on a feature matrix and {0,1} labels. Aborts on the
    /// first scoring failure; a partially-filled score grid would corrupt
    /// threshold selection.
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError>;

    /// Predict {0,1} labels for each row of `x`.
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, ModelError>;

    /// Write the fitted state, training data included, to a `.json` artifact.
    fn save(&self, path: &Path) -> Result<(), ModelError>;

    /// Overwrite this model's state from a `.json` artifact.
    fn load(&mut self, path: &Path) -> Result<(), ModelError>;

    /// Human readable model name, also used for artifact file names.
    fn name(&self) -> &str;

    /// Best F-beta score seen during fitting.
    fn optimal_score(&self) -> Result<f64, ModelError>;
}
