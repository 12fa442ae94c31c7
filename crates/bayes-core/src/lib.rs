//! # bayes-core
//!
//! Foundation crate for the Bayes tree.
//! Defines variable keys, permutations, the conditional/factor/elimination
//! capability the tree is generic over, errors, config, and tracing setup.
//! Every other crate in the workspace depends on this.

pub mod bayes_net;
pub mod config;
pub mod constants;
pub mod errors;
pub mod permutation;
pub mod tracing_setup;
pub mod traits;

/// Opaque identifier of one random variable.
///
/// Keys are dense and totally ordered; the ordering encodes elimination
/// order, so ancestors in a tree carry higher keys than their descendants.
pub type Key = usize;

// Re-export the most commonly used types at the crate root.
pub use bayes_net::BayesNet;
pub use config::TreeConfig;
pub use errors::{BayesError, BayesResult, TreeError, TreeResult};
pub use permutation::Permutation;
pub use traits::{Conditional, Eliminate, Eliminated, Factor, FactorGraph};
