//! Error types for the grid layer.

use grid_common::{ErrorCategory, GridError};
use thiserror::Error;

/// Errors that can occur while building or loading a grid layer.
#[derive(Error, Debug)]
pub enum LayerError {
    /// Coverage model or rendering error.
    #[error(transparent)]
    Grid(#[from] GridError),

    /// The coverage source failed.
    #[error("coverage source error: {0}")]
    Source(String),

    /// Failed to read a coverage file.
    #[error("failed to read coverage: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl LayerError {
    /// Create a Source error.
    pub fn source_failed(msg: impl Into<String>) -> Self {
        Self::Source(msg.into())
    }

    /// Create a Config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            LayerError::Grid(err) => err.category(),
            LayerError::Source(_) | LayerError::Io(_) => ErrorCategory::Source,
            LayerError::Config(_) => ErrorCategory::Construction,
        }
    }
}

impl From<serde_json::Error> for LayerError {
    fn from(err: serde_json::Error) -> Self {
        Self::Grid(err.into())
    }
}

/// Result type for grid layer operations.
pub type Result<T> = std::result::Result<T, LayerError>;
