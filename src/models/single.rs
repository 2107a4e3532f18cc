//! Single-threshold classifier over ping-count features.
//!
//! Searches one integer threshold k in [1, 60] maximizing F-beta(0.5): a gap
//! event is predicted to be an intentional disabling event iff every
//! ping-count feature handed to the model is at least k. The features are
//! ping counts over comparable time windows before the gap, so one shared
//! threshold with an AND test is the whole hypothesis space.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::math::{Array1, Array2};
use crate::models::classifier_trait::ThresholdModel;
use crate::models::{require_json_extension, MAX_THRESHOLD, MIN_PING_THRESHOLD};
use crate::stats::{fbeta_score, DEFAULT_BETA};

/// State created by `fit` and owned as a serializable copy, so that a saved
/// artifact is inspectable without the original snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedSingle {
    #[serde(rename = "X_")]
    x: Vec<Vec<f64>>,
    #[serde(rename = "y_")]
    y: Vec<u8>,
    #[serde(rename = "test_thresholds_")]
    test_thresholds: Vec<u32>,
    #[serde(rename = "threshold_scores_")]
    threshold_scores: Vec<f64>,
    #[serde(rename = "k_")]
    k: u32,
    #[serde(rename = "optimal_score_")]
    optimal_score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct SingleArtifact {
    model_name: String,
    lowest_rec: u32,
    #[serde(flatten)]
    fitted: FittedSingle,
}

#[derive(Debug, Clone)]
pub struct SingleThresholdClassifier {
    model_name: String,
    // Provenance only: the upstream reception filter this dataset was built
    // with. Never consulted during fitting or prediction.
    lowest_rec: u32,
    state: Option<FittedSingle>,
}

impl SingleThresholdClassifier {
    pub fn new(model_name: impl Into<String>, lowest_rec: u32) -> Self {
        Self {
            model_name: model_name.into(),
            lowest_rec,
            state: None,
        }
    }

    pub fn lowest_rec(&self) -> u32 {
        self.lowest_rec
    }

    pub fn is_fitted(&self) -> bool {
        self.state.is_some()
    }

    fn fitted(&self, op: &'static str) -> Result<&FittedSingle, ModelError> {
        self.state.as_ref().ok_or(ModelError::NotFitted(op))
    }

    /// The selected ping-count threshold.
    pub fn optimal_threshold(&self) -> Result<u32, ModelError> {
        Ok(self.fitted("optimal_threshold")?.k)
    }

    /// Every threshold evaluated during fitting, ascending.
    pub fn test_thresholds(&self) -> Result<&[u32], ModelError> {
        Ok(&self.fitted("test_thresholds")?.test_thresholds)
    }

    /// F-beta score per evaluated threshold, aligned with `test_thresholds`.
    /// Downstream response-curve figures are drawn from this.
    pub fn threshold_scores(&self) -> Result<&[f64], ModelError> {
        Ok(&self.fitted("threshold_scores")?.threshold_scores)
    }

    /// Serializable copy of the training inputs.
    pub fn training_data(&self) -> Result<(&[Vec<f64>], &[u8]), ModelError> {
        let fitted = self.fitted("training_data")?;
        Ok((&fitted.x, &fitted.y))
    }

    fn validate_training(&self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
        if x.nrows() == 0 || x.ncols() == 0 {
            return Err(ModelError::Validation(format!(
                "feature matrix of shape {:?} is empty",
                x.shape()
            )));
        }
        if y.len() != x.nrows() {
            return Err(ModelError::Validation(format!(
                "label vector length {} does not match {} samples",
                y.len(),
                x.nrows()
            )));
        }
        if let Some(bad) = y.iter().find(|&&v| v > 1) {
            return Err(ModelError::Validation(format!(
                "labels must be 0 or 1, found {}",
                bad
            )));
        }
        Ok(())
    }

    fn predict_with_threshold(x: &Array2<f64>, k: u32) -> Array1<u8> {
        let threshold = k as f64;
        (0..x.nrows())
            .map(|row| {
                let passes = x.row_slice(row).iter().all(|&v| v >= threshold);
                passes as u8
            })
            .collect()
    }
}

impl ThresholdModel for SingleThresholdClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
        self.validate_training(x, y)?;

        let test_thresholds: Vec<u32> = (MIN_PING_THRESHOLD..=MAX_THRESHOLD).collect();
        let mut threshold_scores = Vec::with_capacity(test_thresholds.len());
        let mut best_k = MIN_PING_THRESHOLD;
        let mut best_score = f64::NEG_INFINITY;

        for &t in &test_thresholds {
            let preds = Self::predict_with_threshold(x, t);
            let score = fbeta_score(y.as_slice(), preds.as_slice(), DEFAULT_BETA);
            // Strict greater-than on an ascending scan: ties resolve to the
            // lowest threshold, which downstream tables depend on.
            if score > best_score {
                best_score = score;
                best_k = t;
            }
            threshold_scores.push(score);
        }

        log::debug!(
            "{}: fitted k={} with F{} score {:.4} over {} thresholds",
            self.model_name,
            best_k,
            DEFAULT_BETA,
            best_score,
            threshold_scores.len()
        );

        self.state = Some(FittedSingle {
            x: x.to_nested_vec(),
            y: y.to_vec(),
            test_thresholds,
            threshold_scores,
            k: best_k,
            optimal_score: best_score,
        });
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> Result<Array1<u8>, ModelError> {
        let fitted = self.fitted("predict")?;
        let trained_cols = fitted.x.first().map(|row| row.len()).unwrap_or(0);
        if x.nrows() == 0 {
            return Err(ModelError::Validation(
                "cannot predict on an empty feature matrix".to_string(),
            ));
        }
        if x.ncols() != trained_cols {
            return Err(ModelError::Validation(format!(
                "expected {} feature columns, got {}",
                trained_cols,
                x.ncols()
            )));
        }
        Ok(Self::predict_with_threshold(x, fitted.k))
    }

    fn save(&self, path: &Path) -> Result<(), ModelError> {
        let fitted = self.fitted("save")?;
        require_json_extension(path)?;
        let artifact = SingleArtifact {
            model_name: self.model_name.clone(),
            lowest_rec: self.lowest_rec,
            fitted: fitted.clone(),
        };
        let mut writer = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut writer, &artifact)?;
        writer.flush()?;
        Ok(())
    }

    fn load(&mut self, path: &Path) -> Result<(), ModelError> {
        require_json_extension(path)?;
        let reader = BufReader::new(File::open(path)?);
        let artifact: SingleArtifact = serde_json::from_reader(reader)?;
        self.model_name = artifact.model_name;
        self.lowest_rec = artifact.lowest_rec;
        self.state = Some(artifact.fitted);
        Ok(())
    }

    fn name(&self) -> &str {
        &self.model_name
    }

    fn optimal_score(&self) -> Result<f64, ModelError> {
        Ok(self.fitted("optimal_score")?.optimal_score)
    }
}
