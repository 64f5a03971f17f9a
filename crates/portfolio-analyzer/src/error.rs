//! Error Types for the Portfolio Analyzer
//!
//! The engine degrades gracefully on bad data. Only structurally invalid
//! requests and invalid configuration surface as errors.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalyzerError>;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("Invalid analysis request: {0}")]
    Validation(String),

    #[error("Invalid configuration value for {key}: {value:?}")]
    Config { key: String, value: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalyzerError {
    pub fn config(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Config {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Short machine-readable code for the advice layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "INVALID_REQUEST",
            Self::Config { .. } => "INVALID_CONFIG",
            Self::Serialization(_) => "SERIALIZATION",
        }
    }
}
