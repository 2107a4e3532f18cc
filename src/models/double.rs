//! Double-threshold classifier over reception quality and ping counts.
//!
//! Jointly searches a reception threshold j in [lowest_rec + 1, 60] over
//! feature column 0 and a ping-count threshold k in [1, 60] over the
//! remaining columns, maximizing F-beta(0.5) of the combined AND test:
//! a gap event is predicted as disabling iff reception >= j and every
//! ping-count column >= k. The full 2-D score grid is the most expensive
//! computation in the pipeline, so rows are fanned out one task per
//! reception threshold and reassembled in submission order before the
//! selection scan.
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::math::{Array1, Array2};
use crate::models::classifier_trait::ThresholdModel;
use crate::models::{require_json_extension, MAX_THRESHOLD, MIN_PING_THRESHOLD};
use crate::stats::{fbeta_score, DEFAULT_BETA};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct FittedDouble {
    #[serde(rename = "X_")]
    x: Vec<Vec<f64>>,
    #[serde(rename = "y_")]
    y: Vec<u8>,
    #[serde(rename = "test_rec_thresholds_")]
    test_rec_thresholds: Vec<u32>,
    #[serde(rename = "test_ping_thresholds_")]
    test_ping_thresholds: Vec<u32>,
    /// Score grid, rows indexed by reception threshold, columns by ping
    /// threshold.
    #[serde(rename = "threshold_scores_")]
    threshold_scores: Vec<Vec<f64>>,
    #[serde(rename = "j_")]
    j: u32,
    #[serde(rename = "k_")]
    k: u32,
    #[serde(rename = "optimal_score_")]
    optimal_score: f64,
}

#[derive(Debug, Serialize, Deserialize)]
struct DoubleArtifact {
    model_name: String,
    lowest_rec: u32,
    #[serde(flatten)]
    fitted: FittedDouble,
}

#[derive(Debug, Clone)]
pub struct DoubleThresholdClassifier {
    model_name: String,
    /// Lower bound of the reception threshold search, matching the upstream
    /// reception filter the dataset was built with.
    lowest_rec: u32,
    state: Option<FittedDouble>,
}

impl DoubleThresholdClassifier {
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

    fn fitted(&self, op: &'static str) -> Result<&FittedDouble, ModelError> {
        self.state.as_ref().ok_or(ModelError::NotFitted(op))
    }

    /// The selected (reception, ping-count) threshold pair.
    pub fn optimal_thresholds(&self) -> Result<(u32, u32), ModelError> {
        let fitted = self.fitted("optimal_thresholds")?;
        Ok((fitted.j, fitted.k))
    }

    /// Reception thresholds evaluated during fitting, ascending.
    pub fn test_rec_thresholds(&self) -> Result<&[u32], ModelError> {
        Ok(&self.fitted("test_rec_thresholds")?.test_rec_thresholds)
    }

    /// Ping-count thresholds evaluated during fitting, ascending.
    pub fn test_ping_thresholds(&self) -> Result<&[u32], ModelError> {
        Ok(&self.fitted("test_ping_thresholds")?.test_ping_thresholds)
    }

    /// 2-D score grid: rows follow `test_rec_thresholds`, columns follow
    /// `test_ping_thresholds`.
    pub fn threshold_scores(&self) -> Result<&[Vec<f64>], ModelError> {
        Ok(&self.fitted("threshold_scores")?.threshold_scores)
    }

    /// Serializable copy of the training inputs.
    pub fn training_data(&self) -> Result<(&[Vec<f64>], &[u8]), ModelError> {
        let fitted = self.fitted("training_data")?;
        Ok((&fitted.x, &fitted.y))
    }

    fn validate_training(&self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
        if x.nrows() == 0 {
            return Err(ModelError::Validation(
                "feature matrix has no gap events".to_string(),
            ));
        }
        if x.ncols() < 2 {
            return Err(ModelError::Validation(format!(
                "need a reception column plus at least one ping-count column, got {} columns",
                x.ncols()
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
        if self.lowest_rec >= MAX_THRESHOLD {
            return Err(ModelError::Validation(format!(
                "lowest_rec {} leaves no reception thresholds below {}",
                self.lowest_rec, MAX_THRESHOLD
            )));
        }
        Ok(())
    }

    fn predict_with_thresholds(x: &Array2<f64>, j: u32, k: u32) -> Array1<u8> {
        let rec_threshold = j as f64;
        let ping_threshold = k as f64;
        (0..x.nrows())
            .map(|row| {
                let values = x.row_slice(row);
                let passes = values[0] >= rec_threshold
                    && values[1..].iter().all(|&v| v >= ping_threshold);
                passes as u8
            })
            .collect()
    }
}

impl ThresholdModel for DoubleThresholdClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<u8>) -> Result<(), ModelError> {
        self.validate_training(x, y)?;

        let test_rec_thresholds: Vec<u32> = (self.lowest_rec + 1..=MAX_THRESHOLD).collect();
        let test_ping_thresholds: Vec<u32> = (MIN_PING_THRESHOLD..=MAX_THRESHOLD).collect();

        // One task per reception threshold; collect reassembles rows in
        // submission order, which the tie-breaking scan below relies on.
        let threshold_scores: Vec<Vec<f64>> = test_rec_thresholds
            .par_iter()
            .map(|&j| {
                test_ping_thresholds
                    .iter()
                    .map(|&k| {
                        let preds = Self::predict_with_thresholds(x, j, k);
                        fbeta_score(y.as_slice(), preds.as_slice(), DEFAULT_BETA)
                    })
                    .collect()
            })
            .collect();

        // Row-major scan, outer reception ascending, inner ping ascending,
        // strict greater-than: ties resolve to the lowest reception
        // threshold, then the lowest ping threshold.
        let mut best = (test_rec_thresholds[0], test_ping_thresholds[0]);
        let mut best_score = f64::NEG_INFINITY;
        for (row, &j) in test_rec_thresholds.iter().enumerate() {
            for (col, &k) in test_ping_thresholds.iter().enumerate() {
                let score = threshold_scores[row][col];
                if score > best_score {
                    best_score = score;
                    best = (j, k);
                }
            }
        }

        log::debug!(
            "{}: fitted j={} k={} with F{} score {:.4} over a {}x{} grid",
            self.model_name,
            best.0,
            best.1,
            DEFAULT_BETA,
            best_score,
            test_rec_thresholds.len(),
            test_ping_thresholds.len()
        );

        self.state = Some(FittedDouble {
            x: x.to_nested_vec(),
            y: y.to_vec(),
            test_rec_thresholds,
            test_ping_thresholds,
            threshold_scores,
            j: best.0,
            k: best.1,
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
        Ok(Self::predict_with_thresholds(x, fitted.j, fitted.k))
    }

    fn save(&self, path: &Path) -> Result<(), ModelError> {
        let fitted = self.fitted("save")?;
        require_json_extension(path)?;
        let artifact = DoubleArtifact {
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
        let artifact: DoubleArtifact = serde_json::from_reader(reader)?;
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
