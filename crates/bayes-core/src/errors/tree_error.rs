//! Tree structure and query errors.

use super::elimination_error::EliminationError;
use super::error_code::{self, ErrorCode};
use crate::Key;

/// Errors surfaced by tree construction, maintenance, and queries.
///
/// Structural preconditions (running intersection, ordering) are mostly
/// caller responsibility; `StructuralViolation` is only raised where the
/// tree cannot represent the requested shape at all (a second root, a
/// subtree with nowhere to attach) or by the explicit `validate` pass.
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("key {key} is not registered in the tree (index length {len})")]
    OutOfRange { key: Key, len: usize },

    #[error("operation requires a non-empty tree")]
    EmptyTree,

    #[error("clique {id} no longer exists in the tree")]
    StaleClique { id: usize },

    #[error("structural violation: {details}")]
    StructuralViolation { details: String },

    #[error(transparent)]
    Elimination(#[from] EliminationError),
}

impl TreeError {
    pub fn structural(details: impl Into<String>) -> Self {
        Self::StructuralViolation {
            details: details.into(),
        }
    }
}

impl ErrorCode for TreeError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::OutOfRange { .. } => error_code::OUT_OF_RANGE,
            Self::EmptyTree => error_code::EMPTY_TREE,
            Self::StaleClique { .. } => error_code::STALE_CLIQUE,
            Self::StructuralViolation { .. } => error_code::STRUCTURAL_VIOLATION,
            Self::Elimination(e) => e.error_code(),
        }
    }
}
