//! Gap-event dataset container and grouped splitting helpers.
//!
//! This module defines `GapDataset`, the in-memory form of a labeled
//! gap-event snapshot, and the vessel-grouped splitting primitives used by
//! the cross-validation harness and the selection driver. Splits move whole
//! vessels between partitions: one vessel can contribute many gap events and
//! letting them straddle train and test would leak identity information.
use std::collections::{HashMap, HashSet};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::math::{Array1, Array2};

/// Labeled gap events ready for threshold fitting.
///
/// `x` holds one row per gap event; `y` is 1 for a confirmed disabling event
/// and 0 otherwise; `vessel_ids` is the grouping key used only for splitting,
/// never passed into the models themselves.
#[derive(Debug, Clone)]
pub struct GapDataset {
    pub x: Array2<f64>,
    pub y: Array1<u8>,
    pub vessel_ids: Vec<String>,
    pub feature_names: Vec<String>,
}

impl GapDataset {
    pub fn new(
        x: Array2<f64>,
        y: Array1<u8>,
        vessel_ids: Vec<String>,
        feature_names: Vec<String>,
    ) -> anyhow::Result<Self> {
        if y.len() != x.nrows() {
            anyhow::bail!(
                "label vector length {} does not match {} gap events",
                y.len(),
                x.nrows()
            );
        }
        if vessel_ids.len() != x.nrows() {
            anyhow::bail!(
                "vessel id list length {} does not match {} gap events",
                vessel_ids.len(),
                x.nrows()
            );
        }
        if feature_names.len() != x.ncols() {
            anyhow::bail!(
                "{} feature names for {} feature columns",
                feature_names.len(),
                x.ncols()
            );
        }
        Ok(GapDataset {
            x,
            y,
            vessel_ids,
            feature_names,
        })
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn feature_index(&self, name: &str) -> anyhow::Result<usize> {
        self.feature_names
            .iter()
            .position(|n| n == name)
            .ok_or_else(|| anyhow::anyhow!("feature column '{}' not found", name))
    }

    pub fn column(&self, name: &str) -> anyhow::Result<Array1<f64>> {
        Ok(self.x.column(self.feature_index(name)?))
    }

    /// Keep only rows where `mask[i]` is true.
    pub fn filter(&self, mask: &Array1<bool>) -> GapDataset {
        let indices: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| if keep { Some(i) } else { None })
            .collect();
        self.select_rows(&indices)
    }

    pub fn select_rows(&self, indices: &[usize]) -> GapDataset {
        GapDataset {
            x: self.x.select_rows(indices),
            y: self.y.select(indices),
            vessel_ids: indices
                .iter()
                .map(|&i| self.vessel_ids[i].clone())
                .collect(),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Project onto the named feature columns, in the given order.
    pub fn select_features(&self, names: &[String]) -> anyhow::Result<GapDataset> {
        let indices = names
            .iter()
            .map(|name| self.feature_index(name))
            .collect::<anyhow::Result<Vec<usize>>>()?;
        Ok(GapDataset {
            x: self.x.select_columns(&indices),
            y: self.y.clone(),
            vessel_ids: self.vessel_ids.clone(),
            feature_names: names.to_vec(),
        })
    }

    pub fn log_input_data_summary(&self) {
        let positives = self.y.iter().filter(|&&v| v == 1).count();
        let vessels: HashSet<&str> = self.vessel_ids.iter().map(|v| v.as_str()).collect();
        log::info!(
            "{} gap events ({} disabling, {} not) from {} vessels, {} feature columns",
            self.n_samples(),
            positives,
            self.n_samples() - positives,
            vessels.len(),
            self.x.ncols()
        );
    }
}

/// Draw one vessel-grouped train/test partition.
///
/// Whole groups are moved into the test partition, in shuffled order, until
/// the test row count reaches `test_size` of the total; remaining groups form
/// the train partition. Because groups move as units the realized proportions
/// drift from `test_size` on datasets with large vessels, which is expected
/// and documented behavior.
///
/// Returned index lists are sorted ascending.
pub fn grouped_shuffle_split(
    groups: &[String],
    test_size: f64,
    rng: &mut StdRng,
) -> (Vec<usize>, Vec<usize>) {
    // Unique groups in first-appearance order, so shuffling is the only
    // source of randomness.
    let mut group_rows: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut unique: Vec<&str> = Vec::new();
    for (idx, group) in groups.iter().enumerate() {
        let entry = group_rows.entry(group.as_str()).or_default();
        if entry.is_empty() {
            unique.push(group.as_str());
        }
        entry.push(idx);
    }

    unique.shuffle(rng);

    let target = (test_size * groups.len() as f64).round() as usize;
    let mut test: Vec<usize> = Vec::new();
    let mut train: Vec<usize> = Vec::new();
    for group in unique {
        let rows = &group_rows[group];
        if test.len() < target {
            test.extend_from_slice(rows);
        } else {
            train.extend_from_slice(rows);
        }
    }

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Repeated vessel-grouped shuffle splitter.
///
/// Yields `n_splits` independent train/test partitions drawn from a single
/// seeded generator, so a given (seed, groups) pair always produces the same
/// split sequence.
#[derive(Debug, Clone)]
pub struct GroupShuffleSplit {
    pub n_splits: usize,
    pub test_size: f64,
    pub seed: u64,
}

impl GroupShuffleSplit {
    pub fn split(&self, groups: &[String]) -> Vec<(Vec<usize>, Vec<usize>)> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        (0..self.n_splits)
            .map(|_| grouped_shuffle_split(groups, self.test_size, &mut rng))
            .collect()
    }
}
