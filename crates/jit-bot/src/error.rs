//! Error types for the bot application.

use thiserror::Error;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid quote configuration: {0}")]
    Core(#[from] jit_core::CoreError),

    #[error("Invalid pubkey for {field}: {value}")]
    InvalidPubkey { field: &'static str, value: String },

    #[error("Logging setup failed: {0}")]
    Logging(String),
}

/// Result type alias for application operations.
pub type AppResult<T> = std::result::Result<T, AppError>;
