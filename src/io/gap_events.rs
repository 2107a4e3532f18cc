//! Labeled gap-event CSV reader.
//!
//! The labeled dataset is a flat snapshot produced by the upstream SQL
//! pipeline: one row per gap event with a vessel id, an "off" reception
//! estimate, ping counts for several windows before the gap, and the binary
//! ground truth. This crate never queries the warehouse; it only reads the
//! exported file.
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use csv::StringRecord;

use crate::data_handling::GapDataset;
use crate::math::{Array1, Array2};

/// Configuration for reading a labeled gap-event CSV snapshot.
#[derive(Debug, Clone)]
pub struct GapEventReaderConfig {
    /// Column holding the vessel identifier used for grouped splits.
    pub vessel_id_column: String,
    /// Column holding the {0,1} ground-truth label.
    pub label_column: String,
    /// Feature columns to load, in order. For double-threshold candidates
    /// the reception column conventionally comes first.
    pub feature_columns: Vec<String>,
}

impl Default for GapEventReaderConfig {
    fn default() -> Self {
        Self {
            vessel_id_column: "ssvid".to_string(),
            label_column: "is_real_gap".to_string(),
            feature_columns: vec![
                "positions_per_day_off".to_string(),
                "positions_12_hours_before_sat".to_string(),
                "positions_18_hours_before_sat".to_string(),
                "positions_24_hours_before_sat".to_string(),
            ],
        }
    }
}

/// Read a labeled gap-event CSV with the default column layout.
pub fn read_gap_events_csv<P: AsRef<Path>>(path: P) -> Result<GapDataset> {
    read_gap_events_csv_with_config(path, &GapEventReaderConfig::default())
}

/// Read a labeled gap-event CSV using a custom column configuration.
pub fn read_gap_events_csv_with_config<P: AsRef<Path>>(
    path: P,
    config: &GapEventReaderConfig,
) -> Result<GapDataset> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Failed to open gap-event file: {}", path.as_ref().display()))?;

    let headers = reader
        .headers()
        .context("Failed to read gap-event header row")?
        .clone();

    let vessel_idx = find_column(&headers, &config.vessel_id_column)
        .ok_or_else(|| anyhow!("Missing vessel id column '{}'", config.vessel_id_column))?;
    let label_idx = find_column(&headers, &config.label_column)
        .ok_or_else(|| anyhow!("Missing label column '{}'", config.label_column))?;

    let mut feature_indices = Vec::with_capacity(config.feature_columns.len());
    for name in &config.feature_columns {
        let idx = find_column(&headers, name)
            .ok_or_else(|| anyhow!("Missing feature column '{}'", name))?;
        feature_indices.push(idx);
    }
    if feature_indices.is_empty() {
        return Err(anyhow!("No feature columns configured"));
    }

    let mut features = Vec::new();
    let mut labels = Vec::new();
    let mut vessel_ids = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read row {}", row_idx + 1))?;

        let vessel = record
            .get(vessel_idx)
            .ok_or_else(|| anyhow!("Missing vessel id at row {}", row_idx + 1))?;
        vessel_ids.push(vessel.trim().to_string());

        let label = parse_label(record.get(label_idx), row_idx)?;
        labels.push(label);

        for &idx in &feature_indices {
            let value = record
                .get(idx)
                .ok_or_else(|| anyhow!("Missing feature value at row {}", row_idx + 1))?;
            let parsed = value.trim().parse::<f64>().with_context(|| {
                format!(
                    "Invalid feature '{}' at row {}",
                    headers.get(idx).unwrap_or(""),
                    row_idx + 1
                )
            })?;
            features.push(parsed);
        }
    }

    let n_samples = labels.len();
    let x = Array2::from_shape_vec((n_samples, feature_indices.len()), features)
        .context("Failed to build feature matrix")?;
    let y = Array1::from_vec(labels);

    GapDataset::new(x, y, vessel_ids, config.feature_columns.clone())
}

fn parse_label(value: Option<&str>, row_idx: usize) -> Result<u8> {
    let raw = value
        .ok_or_else(|| anyhow!("Missing label value at row {}", row_idx + 1))?
        .trim();
    match raw {
        "0" | "false" | "False" => Ok(0),
        "1" | "true" | "True" => Ok(1),
        _ => Err(anyhow!("Invalid label '{}' at row {}", raw, row_idx + 1)),
    }
}

fn find_column(headers: &StringRecord, name: &str) -> Option<usize> {
    headers
        .iter()
        .position(|header| header.eq_ignore_ascii_case(name))
}
