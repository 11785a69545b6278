//! # Manager Errors

use thiserror::Error;

use crate::store::StoreError;

/// Result type for manager operations
pub type ManagerResult<T> = Result<T, ManagerError>;

/// Errors surfaced by [`RecordManager`](super::RecordManager) operations
///
/// Blob staging failures are not among them: the blob field is dropped and
/// counted in `fields_dropped`, and the rest of the record is saved.
#[derive(Debug, Clone, Error)]
pub enum ManagerError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Failed to decode {record_type} record {id}")]
    Decode { record_type: String, id: String },

    #[error("{record_type} has no record identifier")]
    MissingIdentifier { record_type: String },

    #[error("No matching {record_type} record")]
    NotFound { record_type: String },

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: &'static str, after_ms: u64 },

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ManagerError {
    /// Stable error code; store errors keep their own
    pub fn code(&self) -> &'static str {
        match self {
            ManagerError::Store(e) => e.code(),
            ManagerError::Decode { .. } => "MANAGER_DECODE",
            ManagerError::MissingIdentifier { .. } => "MANAGER_MISSING_IDENTIFIER",
            ManagerError::NotFound { .. } => "MANAGER_NOT_FOUND",
            ManagerError::Timeout { .. } => "MANAGER_TIMEOUT",
            ManagerError::Config(_) => "MANAGER_CONFIG",
        }
    }

    pub(crate) fn missing_identifier(record_type: &str) -> Self {
        ManagerError::MissingIdentifier {
            record_type: record_type.to_string(),
        }
    }
}
