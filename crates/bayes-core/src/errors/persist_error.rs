//! Snapshot persistence errors.

use super::error_code::{self, ErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("snapshot format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { expected: u32, found: u32 },

    #[error("serialization mismatch: {details}")]
    SerializationMismatch { details: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PersistError {
    pub fn mismatch(details: impl Into<String>) -> Self {
        Self::SerializationMismatch {
            details: details.into(),
        }
    }
}

impl ErrorCode for PersistError {
    fn error_code(&self) -> &'static str {
        error_code::SERIALIZATION_MISMATCH
    }
}
