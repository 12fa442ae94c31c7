//! Configuration for the Bayes tree.
//! TOML-based, 3-layer resolution: env > project file > defaults.

pub mod tree_config;

pub use tree_config::TreeConfig;
