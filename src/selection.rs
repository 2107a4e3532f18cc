//! Model selection driver: hold-out split, per-candidate cross-validation,
//! final refit and artifact persistence for one minimum-reception filter.
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::config::{CandidateSpec, SelectionConfig};
use crate::cross_validation::RepeatedGroupedCv;
use crate::data_handling::{grouped_shuffle_split, GapDataset};
use crate::models::factory;
use crate::stats::{mean, standard_error};

/// Cross-validated scores for one candidate family, rounded for persistence.
#[derive(Debug, Serialize)]
pub struct CandidateCvSummary {
    pub model_name: String,
    /// One inner vector per repeat, one score per fold.
    pub fold_scores: Vec<Vec<f64>>,
    pub mean_score: f64,
    pub std_error: f64,
}

/// Everything a run produces besides the artifact files themselves.
pub struct SelectionOutcome {
    pub summaries: Vec<CandidateCvSummary>,
    /// Where the aggregated CV results landed (JSON, or the text fallback).
    pub results_path: PathBuf,
    pub artifact_paths: Vec<PathBuf>,
    /// The held-out partition, untouched by fitting, for downstream
    /// evaluation and figures.
    pub test: GapDataset,
}

pub struct ModelSelection {
    pub config: SelectionConfig,
}

impl ModelSelection {
    pub fn new(config: SelectionConfig) -> Self {
        Self { config }
    }

    /// Run one full selection sweep.
    ///
    /// `reception_column` names the "off" reception feature used for the
    /// trust filter; `candidates` are evaluated on identical splits so their
    /// scores are directly comparable.
    pub fn run(
        &self,
        dataset: &GapDataset,
        reception_column: &str,
        candidates: &[CandidateSpec],
    ) -> Result<SelectionOutcome> {
        let cfg = &self.config;
        dataset.log_input_data_summary();

        // Labels on gaps in near-dead reception areas are not trustworthy:
        // an absent signal tells us nothing about the transponder there.
        let reception = dataset.column(reception_column)?;
        let mask = reception.mapv(|&v| v > cfg.lowest_rec as f64);
        let filtered = dataset.filter(&mask);
        log::info!(
            "reception filter > {} kept {} of {} gap events",
            cfg.lowest_rec,
            filtered.n_samples(),
            dataset.n_samples()
        );
        if filtered.n_samples() == 0 {
            anyhow::bail!(
                "no gap events remain above reception {}",
                cfg.lowest_rec
            );
        }

        let mut rng = StdRng::seed_from_u64(cfg.holdout_seed);
        let (train_idx, test_idx) =
            grouped_shuffle_split(&filtered.vessel_ids, cfg.holdout_test_size, &mut rng);
        let train = filtered.select_rows(&train_idx);
        let test = filtered.select_rows(&test_idx);
        log::info!(
            "holdout split: {} train / {} test gap events ({:.0}/{:.0})",
            train.n_samples(),
            test.n_samples(),
            100.0 * train.n_samples() as f64 / filtered.n_samples() as f64,
            100.0 * test.n_samples() as f64 / filtered.n_samples() as f64
        );

        let cv = RepeatedGroupedCv {
            num_repeats: cfg.num_repeats,
            folds_per_repeat: cfg.folds_per_repeat,
            test_size: cfg.cv_test_size,
            master_seed: cfg.master_seed,
            return_estimators: cfg.return_estimators,
        };

        let mut summaries = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let sub = train
                .select_features(&candidate.feature_columns)
                .with_context(|| format!("resolving features for '{}'", candidate.name))?;
            let repeats = cv
                .run(candidate, cfg.lowest_rec, &sub.x, &sub.y, &train.vessel_ids)
                .with_context(|| format!("cross-validating '{}'", candidate.name))?;

            let fold_scores: Vec<Vec<f64>> = repeats
                .iter()
                .map(|repeat| {
                    repeat
                        .test_scores
                        .iter()
                        .map(|&s| round_to(s, cfg.score_precision))
                        .collect()
                })
                .collect();
            let flat: Vec<f64> = repeats
                .iter()
                .flat_map(|repeat| repeat.test_scores.iter().copied())
                .collect();
            let summary = CandidateCvSummary {
                model_name: candidate.name.clone(),
                fold_scores,
                mean_score: round_to(mean(&flat), cfg.score_precision),
                std_error: round_to(standard_error(&flat), cfg.score_precision),
            };
            log::info!(
                "{}: cross-validated F0.5 {:.4} +/- {:.4}",
                summary.model_name,
                summary.mean_score,
                summary.std_error
            );
            summaries.push(summary);
        }

        fs::create_dir_all(&cfg.output_dir)
            .with_context(|| format!("creating {}", cfg.output_dir.display()))?;
        let results_path = write_cv_results(&cfg.output_dir, &summaries)?;

        // Final models come from a single refit on the full training
        // partition, not from any CV fold.
        let mut artifact_paths = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let sub = train.select_features(&candidate.feature_columns)?;
            let mut model = factory::build_model(candidate, cfg.lowest_rec);
            model
                .fit(&sub.x, &sub.y)
                .with_context(|| format!("refitting '{}' on the training set", candidate.name))?;
            let path = cfg.output_dir.join(format!("{}.json", candidate.name));
            model
                .save(&path)
                .with_context(|| format!("saving '{}'", candidate.name))?;
            log::info!("saved {} to {}", candidate.name, path.display());
            artifact_paths.push(path);
        }

        Ok(SelectionOutcome {
            summaries,
            results_path,
            artifact_paths,
            test,
        })
    }
}

/// Write aggregated CV results as JSON, falling back to a plain-text dump
/// when the structure is not JSON-safe (e.g. non-finite scores). The
/// fallback is deliberate: losing a finished CV sweep to a serialization
/// quirk is worse than an uglier file.
pub fn write_cv_results(output_dir: &Path, summaries: &[CandidateCvSummary]) -> Result<PathBuf> {
    // serde_json would quietly turn NaN/inf into null, corrupting the
    // results, so non-finite scores take the text path too.
    let json = if summaries.iter().all(summary_is_finite) {
        serde_json::to_string_pretty(summaries).ok()
    } else {
        None
    };

    match json {
        Some(json) => {
            let json_path = output_dir.join("cv_results.json");
            let mut file = File::create(&json_path)
                .with_context(|| format!("creating {}", json_path.display()))?;
            file.write_all(json.as_bytes())?;
            log::info!("wrote CV results to {}", json_path.display());
            Ok(json_path)
        }
        None => {
            let text_path = output_dir.join("cv_results.txt");
            log::warn!(
                "CV results not JSON-serializable; writing text dump to {}",
                text_path.display()
            );
            let mut file = File::create(&text_path)
                .with_context(|| format!("creating {}", text_path.display()))?;
            writeln!(file, "{:#?}", summaries)?;
            Ok(text_path)
        }
    }
}

fn summary_is_finite(summary: &CandidateCvSummary) -> bool {
    summary.mean_score.is_finite()
        && summary.std_error.is_finite()
        && summary
            .fold_scores
            .iter()
            .flatten()
            .all(|score| score.is_finite())
}

fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}
