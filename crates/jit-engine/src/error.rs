//! Error types for jit-engine.

use thiserror::Error;

/// Engine error types.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("slot feed closed")]
    SlotFeedClosed,

    #[error("engine is shutting down")]
    Shutdown,
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;
