//! gapwatch-classifiers: threshold models for AIS disabling detection.
//!
//! This crate provides the model layer of a pipeline that flags suspected
//! intentional AIS transponder disabling by fishing vessels. Labeled gap
//! events (ping-count and reception-quality features plus a binary ground
//! truth) come in as in-memory matrices; fitted threshold models and their
//! cross-validated scores go out as JSON artifacts.
//!
//! The design favors small, testable modules: two threshold classifiers
//! behind a shared trait, a repeated grouped cross-validation harness, and a
//! model-selection driver that holds out a test partition and persists the
//! winning models.
pub mod config;
pub mod cross_validation;
pub mod data_handling;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod selection;
pub mod stats;
