//! Storage error types for the form store backends.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage operation errors.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StorageError {
    /// Entity not found
    #[error("Entity not found: {entity_type} with id {entity_id}")]
    NotFound {
        entity_type: String,
        entity_id: String,
    },
    /// Backend could not be reached
    #[error("Connection error: {0}")]
    ConnectionError(String),
    /// Stored document could not be encoded or decoded
    #[error("Serialization error: {0}")]
    SerializationError(String),
    /// General storage error
    #[error("Storage error: {0}")]
    Other(String),
}

impl StorageError {
    pub fn form_not_found(form_id: impl ToString) -> Self {
        StorageError::NotFound {
            entity_type: "form".to_string(),
            entity_id: form_id.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound { .. })
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Other(format!("I/O error: {}", e))
    }
}
