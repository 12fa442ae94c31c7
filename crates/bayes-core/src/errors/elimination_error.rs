//! Errors raised by a caller-supplied elimination function.

use super::error_code::{self, ErrorCode};
use crate::Key;

#[derive(Debug, thiserror::Error)]
pub enum EliminationError {
    #[error("cannot eliminate {keys:?}: no factor involves them")]
    MissingVariables { keys: Vec<Key> },

    #[error("elimination produced nothing for {keys:?}")]
    EmptyResult { keys: Vec<Key> },

    #[error("elimination of {keys:?} failed: {reason}")]
    Failed { keys: Vec<Key>, reason: String },
}

impl ErrorCode for EliminationError {
    fn error_code(&self) -> &'static str {
        error_code::ELIMINATION_ERROR
    }
}
