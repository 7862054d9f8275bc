//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Aggregation error
    #[error("{0}")]
    Engine(covenant_domain::EngineError),

    /// Store error
    #[error("Store error: {0}")]
    Store(#[from] covenant_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A dashboard panel worker panicked or was cancelled
    #[error("Worker error: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl From<covenant_domain::EngineError> for CliError {
    fn from(err: covenant_domain::EngineError) -> Self {
        if err.is_validation() {
            CliError::InvalidInput(err.to_string())
        } else {
            CliError::Engine(err)
        }
    }
}

impl From<covenant_domain::ValidationError> for CliError {
    fn from(err: covenant_domain::ValidationError) -> Self {
        CliError::InvalidInput(err.to_string())
    }
}
