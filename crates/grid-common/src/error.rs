//! Error types shared by the grid coverage crates.

use thiserror::Error;

use crate::axis::AxisId;

/// Result type alias using GridError.
pub type GridResult<T> = Result<T, GridError>;

/// Primary error type for coverage decoding, rendering and palette handling.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    // === Construction Errors ===
    #[error("Unsupported domain type: {0} (only Grid domains can be rendered)")]
    UnsupportedDomainType(String),

    #[error("Palette has {palette_steps} steps but parameter defines {categories} categories")]
    PaletteCategoryMismatch {
        palette_steps: usize,
        categories: usize,
    },

    #[error("Invalid palette extent: {0}")]
    InvalidPaletteExtent(String),

    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    #[error("Category '{0}' has no preferred color and no palette was supplied")]
    MissingCategoryColor(String),

    #[error("Parameter not found: {0}")]
    ParameterNotFound(String),

    // === Reference System Errors ===
    #[error("Unsupported reference system: {0}")]
    UnsupportedReferenceSystem(String),

    // === Not Implemented ===
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    // === Data Errors ===
    #[error("Axis '{0}' has no values")]
    EmptyAxis(AxisId),

    #[error("Axis '{0}' is missing from the domain")]
    MissingAxis(AxisId),

    #[error("Axis '{0}' is not monotonic")]
    NonMonotonicAxis(AxisId),

    #[error("Range contains no values (all null)")]
    EmptyRange,

    #[error("Invalid range: {0}")]
    InvalidRange(String),

    #[error("Invalid CoverageJSON: {0}")]
    InvalidCoverage(String),

    #[error("Invalid time value: {0}")]
    InvalidTime(String),
}

/// Coarse classification of a [`GridError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Raised synchronously while building a layer or render context.
    Construction,
    /// The domain cannot be placed on a geodetic map.
    ReferenceSystem,
    /// A documented gap; never silently approximated.
    NotImplemented,
    /// Malformed or empty data.
    Data,
    /// The coverage source failed to deliver data.
    Source,
}

impl GridError {
    /// Get the category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            GridError::UnsupportedDomainType(_)
            | GridError::PaletteCategoryMismatch { .. }
            | GridError::InvalidPaletteExtent(_)
            | GridError::InvalidPalette(_)
            | GridError::MissingCategoryColor(_)
            | GridError::ParameterNotFound(_)
            | GridError::InvalidOperation(_) => ErrorCategory::Construction,

            GridError::UnsupportedReferenceSystem(_) => ErrorCategory::ReferenceSystem,

            GridError::NotImplemented(_) => ErrorCategory::NotImplemented,

            _ => ErrorCategory::Data,
        }
    }

    /// Check whether this error is fatal for every tile of a render attempt.
    pub fn aborts_rendering(&self) -> bool {
        matches!(
            self.category(),
            ErrorCategory::ReferenceSystem | ErrorCategory::Construction
        )
    }
}

impl From<serde_json::Error> for GridError {
    fn from(err: serde_json::Error) -> Self {
        GridError::InvalidCoverage(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_categories() {
        assert_eq!(
            GridError::UnsupportedDomainType("Point".into()).category(),
            ErrorCategory::Construction
        );
        assert_eq!(
            GridError::UnsupportedReferenceSystem("EPSG:27700".into()).category(),
            ErrorCategory::ReferenceSystem
        );
        assert_eq!(
            GridError::NotImplemented("fov".into()).category(),
            ErrorCategory::NotImplemented
        );
        assert_eq!(GridError::EmptyRange.category(), ErrorCategory::Data);
        assert_eq!(GridError::EmptyAxis(AxisId::X).category(), ErrorCategory::Data);
    }

    #[test]
    fn test_error_messages() {
        let err = GridError::PaletteCategoryMismatch {
            palette_steps: 3,
            categories: 4,
        };
        assert_eq!(
            err.to_string(),
            "Palette has 3 steps but parameter defines 4 categories"
        );
        assert_eq!(GridError::EmptyAxis(AxisId::T).to_string(), "Axis 't' has no values");
    }
}
