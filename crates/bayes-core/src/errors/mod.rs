//! Error handling for the Bayes tree.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod elimination_error;
pub mod error_code;
pub mod permutation_error;
pub mod persist_error;
pub mod tree_error;

pub use config_error::ConfigError;
pub use elimination_error::EliminationError;
pub use error_code::ErrorCode;
pub use permutation_error::PermutationError;
pub use persist_error::PersistError;
pub use tree_error::TreeError;

/// Result alias for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;

/// Result alias for anything that crosses subsystem boundaries.
pub type BayesResult<T> = Result<T, BayesError>;

/// Aggregate error for callers that drive several subsystems at once.
#[derive(Debug, thiserror::Error)]
pub enum BayesError {
    #[error("Tree error: {0}")]
    Tree(#[from] TreeError),

    #[error("Elimination error: {0}")]
    Elimination(#[from] EliminationError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Permutation error: {0}")]
    Permutation(#[from] PermutationError),
}

impl ErrorCode for BayesError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Tree(e) => e.error_code(),
            Self::Elimination(e) => e.error_code(),
            Self::Persist(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
            Self::Permutation(e) => e.error_code(),
        }
    }
}
