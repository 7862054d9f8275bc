//! Error types for aggregation queries

use thiserror::Error;

/// Malformed filter input
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A year bound is not an integer
    #[error("Invalid year: {0:?}")]
    InvalidYear(String),

    /// Start year after end year
    #[error("Invalid year range: start {start} is after end {end}")]
    InvertedYearRange {
        /// Requested start year
        start: i32,
        /// Requested end year
        end: i32,
    },
}

/// Errors surfaced by the aggregation engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// Filter input was rejected
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// The storage collaborator failed; its error is carried unchanged
    #[error("Data access error: {0}")]
    DataAccess(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl EngineError {
    /// Wrap a store error
    pub fn data_access<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        EngineError::DataAccess(Box::new(err))
    }

    /// Whether the caller sent bad input (as opposed to a storage failure)
    pub fn is_validation(&self) -> bool {
        matches!(self, EngineError::Validation(_))
    }
}

/// Result alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
