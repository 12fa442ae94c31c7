//! # bayes-tree
//!
//! A clique tree ("Bayes tree") of conditionals produced by eliminating a
//! factor graph. Cliques live in a `petgraph` arena addressed by stable
//! indices; a dense index maps every variable to the clique where it is
//! frontal.
//!
//! The tree is generic over any [`Conditional`](bayes_core::Conditional):
//! it stores and rearranges conditionals, and answers marginal and joint
//! queries by recombining them through a caller-supplied
//! [`Eliminate`](bayes_core::Eliminate) function.
//!
//! Queries memoize shortcuts in the cliques they visit, so a tree must not
//! be queried from several threads without external synchronization.

pub mod clique;
pub mod cliques;
pub mod dims;
pub mod elimination;
pub mod export;
pub mod snapshot;
pub mod tree;
pub mod validate;

pub use clique::{CachedFactor, Clique, CliqueId, CliqueRef};
pub use cliques::{CliqueData, CliqueStats, Cliques};
pub use dims::{allocate_vector_values, VectorValues};
pub use elimination::{eliminate_sequential, joint_bayes_net, joint_factor_graph};
pub use snapshot::{CliqueRecord, TreeSnapshot};
pub use tree::{BayesTree, Removal};
