//! Error types for corpus handling, model fitting and scoring

use thiserror::Error;

/// Result type alias for crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Crate-level errors (I/O, parsing, configuration)
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reading/writing error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Config file could not be parsed
    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Config could not be serialized
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Array shape error while assembling sequences
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Malformed input file
    #[error("Parse error: {0}")]
    Parse(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid input data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Word not present in the corpus
    #[error("Unknown word: {0}")]
    UnknownWord(String),
}

impl Error {
    /// Create a new parse error
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create a new invalid config error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

/// A candidate state count could not be trained
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FitError {
    #[error("state count must be positive, got {0}")]
    InvalidStateCount(usize),

    #[error("insufficient data: {frames} frames for {n_states} states")]
    InsufficientData { frames: usize, n_states: usize },

    #[error("log-likelihood became non-finite at iteration {iteration}")]
    NonFinite { iteration: usize },

    #[error("state {state} has a degenerate covariance")]
    Degenerate { state: usize },

    #[error("training data rejected: {0}")]
    Data(String),
}

/// A trained model could not evaluate a batch of sequences
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoreError {
    #[error("feature dimension mismatch: model has {expected}, data has {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("no sequences to score")]
    Empty,

    #[error("log-likelihood is not finite")]
    NonFinite,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::invalid_config("min_n_components > max_n_components");
        assert_eq!(
            err.to_string(),
            "Invalid configuration: min_n_components > max_n_components"
        );

        let fit = FitError::InsufficientData {
            frames: 2,
            n_states: 5,
        };
        assert!(fit.to_string().contains("2 frames for 5 states"));
    }
}
