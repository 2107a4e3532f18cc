//! Small ndarray-like types used throughout the crate.
//!
//! Provides `Array2` (2D, row-major) and `Array1` (1D) lightweight containers
//! with minimal convenience methods. Gap-event feature matrices are small
//! enough (thousands of rows, a handful of columns) that a dependency-free
//! container keeps the crate portable and easy to test.
pub mod matrix;
pub mod vector;

pub use matrix::{Array2, ShapeError};
pub use vector::Array1;
