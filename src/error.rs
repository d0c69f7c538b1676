//! Error types for Life in Data

use thiserror::Error;

/// Errors that can occur while loading, aggregating or predicting
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Malformed {source_name} export: {reason}")]
    MalformedSource { source_name: String, reason: String },

    #[error("Unparseable timestamp: {0}")]
    UnparseableTimestamp(String),

    #[error("Insufficient history: need at least 2 daily rows, found {rows}")]
    InsufficientHistory { rows: usize },

    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid timezone: {0}")]
    InvalidTimezone(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Build a `MalformedSource` error for the given source label
    pub fn malformed(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::MalformedSource {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Stable label for logs and CLI error codes
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::MalformedSource { .. } => "MALFORMED_SOURCE",
            PipelineError::UnparseableTimestamp(_) => "UNPARSEABLE_TIMESTAMP",
            PipelineError::InsufficientHistory { .. } => "INSUFFICIENT_HISTORY",
            PipelineError::ModelUnavailable(_) => "MODEL_UNAVAILABLE",
            PipelineError::JsonError(_) => "JSON_ERROR",
            PipelineError::InvalidTimezone(_) => "INVALID_TIMEZONE",
            PipelineError::ConfigError(_) => "CONFIG_ERROR",
            PipelineError::Io(_) => "IO_ERROR",
        }
    }
}
