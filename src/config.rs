use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which threshold family a candidate model belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    SingleThreshold,
    DoubleThreshold,
}

impl FromStr for ModelKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "single_threshold" => Ok(ModelKind::SingleThreshold),
            "double" | "double_threshold" => Ok(ModelKind::DoubleThreshold),
            _ => Err(format!(
                "Unknown model kind: {}. Expected 'single' or 'double'",
                s
            )),
        }
    }
}

/// One candidate model family evaluated during selection.
///
/// Candidates within a family differ only in which feature columns they
/// receive. For `DoubleThreshold` the first entry of `feature_columns` must
/// be the reception-quality column; the remaining entries are ping counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateSpec {
    pub name: String,
    pub kind: ModelKind,
    pub feature_columns: Vec<String>,
}

impl CandidateSpec {
    pub fn new(name: impl Into<String>, kind: ModelKind, feature_columns: Vec<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            feature_columns,
        }
    }
}

/// Full configuration for one model-selection run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Minimum "off" reception below which labels are not trusted; rows at or
    /// below this are dropped before any splitting. Also the lower bound of
    /// the double model's reception threshold search.
    pub lowest_rec: u32,
    /// Requested holdout fraction. With vessels moving as whole groups this
    /// setting plus `holdout_seed` lands close to a 70/30 row split on the
    /// labeled dataset; the realized proportion varies by dataset.
    pub holdout_test_size: f64,
    pub holdout_seed: u64,
    /// Number of independent repeated-CV sweeps per candidate.
    pub num_repeats: usize,
    /// Shuffle splits drawn within each repeat.
    pub folds_per_repeat: usize,
    /// Test fraction of each CV split.
    pub cv_test_size: f64,
    /// Seeds the generator that draws one seed per repeat.
    pub master_seed: u64,
    /// Decimal places kept when writing aggregated CV scores.
    pub score_precision: u32,
    pub output_dir: PathBuf,
    /// Keep every fitted fold estimator in the CV results (debugging only).
    pub return_estimators: bool,
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            lowest_rec: 10,
            holdout_test_size: 0.2,
            holdout_seed: 1234,
            num_repeats: 10,
            folds_per_repeat: 5,
            cv_test_size: 0.1,
            master_seed: 42,
            score_precision: 4,
            output_dir: PathBuf::from("model_artifacts"),
            return_estimators: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn model_kind_from_str() {
        assert_eq!(
            "double".parse::<ModelKind>().unwrap(),
            ModelKind::DoubleThreshold
        );
        assert_eq!(
            "single_threshold".parse::<ModelKind>().unwrap(),
            ModelKind::SingleThreshold
        );
        assert!("forest".parse::<ModelKind>().is_err());
    }

    #[test]
    fn selection_config_round_trips_json() {
        let cfg = SelectionConfig::default();
        let json = serde_json::to_string(&cfg).unwrap();
        let cfg2: SelectionConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(cfg.num_repeats, cfg2.num_repeats);
        assert_eq!(cfg.output_dir, cfg2.output_dir);
    }
}
