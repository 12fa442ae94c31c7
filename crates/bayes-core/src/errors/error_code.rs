//! Stable, machine-readable error codes.

pub const OUT_OF_RANGE: &str = "OUT_OF_RANGE";
pub const EMPTY_TREE: &str = "EMPTY_TREE";
pub const STALE_CLIQUE: &str = "STALE_CLIQUE";
pub const STRUCTURAL_VIOLATION: &str = "STRUCTURAL_VIOLATION";
pub const ELIMINATION_ERROR: &str = "ELIMINATION_ERROR";
pub const SERIALIZATION_MISMATCH: &str = "SERIALIZATION_MISMATCH";
pub const CONFIG_ERROR: &str = "CONFIG_ERROR";
pub const PERMUTATION_ERROR: &str = "PERMUTATION_ERROR";

/// Implemented by every error enum in the workspace.
pub trait ErrorCode {
    fn error_code(&self) -> &'static str;
}
