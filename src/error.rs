use std::error::Error;
use std::fmt;
use std::io;

/// Custom error type for threshold model failures.
#[derive(Debug)]
pub enum ModelError {
    /// Shape or value mismatch between inputs and the model's expectations.
    Validation(String),
    /// An operation that needs fitted state was called before `fit`.
    NotFitted(&'static str),
    /// Artifact path does not carry the required `.json` extension.
    Format(String),
    /// Model state could not be encoded to or decoded from JSON.
    Serialization(String),
    Io(io::Error),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelError::Validation(msg) => write!(f, "invalid input: {}", msg),
            ModelError::NotFitted(op) => {
                write!(f, "'{}' requires a fitted model; call fit first", op)
            }
            ModelError::Format(path) => {
                write!(f, "model artifact path '{}' must end in .json", path)
            }
            ModelError::Serialization(msg) => write!(f, "serialization failed: {}", msg),
            ModelError::Io(err) => write!(f, "io error: {}", err),
        }
    }
}

impl Error for ModelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ModelError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ModelError {
    fn from(err: io::Error) -> Self {
        ModelError::Io(err)
    }
}

impl From<serde_json::Error> for ModelError {
    fn from(err: serde_json::Error) -> Self {
        ModelError::Serialization(err.to_string())
    }
}
