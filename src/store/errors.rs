//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors reported by a record store, surfaced verbatim by the mapping layer
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Transport failure: {0}")]
    Transport(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Store unavailable")]
    Unavailable,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl StoreError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::Transport(_) => "STORE_TRANSPORT",
            StoreError::NotAuthenticated => "STORE_NOT_AUTHENTICATED",
            StoreError::Validation(_) => "STORE_VALIDATION",
            StoreError::Unavailable => "STORE_UNAVAILABLE",
            StoreError::Internal(_) => "STORE_INTERNAL",
        }
    }
}
