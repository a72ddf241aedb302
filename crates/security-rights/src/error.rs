//! Error types for right registration and right sets

use thiserror::Error;

/// Rights error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RightsError {
    /// Malformed or conflicting right definition
    #[error("Invalid right definition: {0}")]
    InvalidDefinition(String),

    /// Ordinal does not fit in a right set
    #[error("Right ordinal {ordinal} exceeds right set capacity {capacity}")]
    CapacityOverflow {
        /// The rejected ordinal.
        ordinal: usize,
        /// Number of bits available.
        capacity: usize,
    },
}

/// Result type for rights operations.
pub type RightsResult<T> = Result<T, RightsError>;

impl RightsError {
    /// Shorthand for an `InvalidDefinition` error.
    pub fn invalid(message: impl Into<String>) -> Self {
        RightsError::InvalidDefinition(message.into())
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            RightsError::InvalidDefinition(_) => "INVALID_RIGHT_DEFINITION",
            RightsError::CapacityOverflow { .. } => "RIGHT_CAPACITY_OVERFLOW",
        }
    }
}
