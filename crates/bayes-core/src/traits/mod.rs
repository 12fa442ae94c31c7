//! The capability a Bayes tree is generic over.
//!
//! The tree never inspects the probability content of what it stores; it
//! only needs variable sets, relabelling, tolerant equality, and a way to
//! turn factors back into conditionals ([`Eliminate`]).

pub mod conditional;
pub mod eliminate;
pub mod factor;

pub use conditional::Conditional;
pub use eliminate::{Eliminate, Eliminated};
pub use factor::{Factor, FactorGraph};
