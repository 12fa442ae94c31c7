use super::error_code::{self, ErrorCode};
use crate::Key;

#[derive(Debug, thiserror::Error)]
pub enum PermutationError {
    #[error("target {target} is out of range for a permutation of length {len}")]
    TargetOutOfRange { target: Key, len: usize },

    #[error("target {target} is assigned more than once")]
    DuplicateTarget { target: Key },
}

impl ErrorCode for PermutationError {
    fn error_code(&self) -> &'static str {
        error_code::PERMUTATION_ERROR
    }
}
