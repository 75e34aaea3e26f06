//! Error kinds for the few pipeline preconditions Rust can express.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// The forecaster needs at least one historical point to anchor the trend.
    #[error("cannot forecast from an empty series")]
    EmptySeries,

    #[error("non-finite value {value} at position {index}")]
    NonFiniteValue { index: usize, value: f64 },
}

pub type Result<T> = std::result::Result<T, AnalysisError>;
