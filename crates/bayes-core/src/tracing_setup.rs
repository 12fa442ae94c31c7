//! Structured tracing: subscriber setup and span definitions per operation family.
//!
//! The library only emits events; installing a subscriber is the embedding
//! application's (or a test's) choice.

use tracing_subscriber::EnvFilter;

/// Install a global `fmt` subscriber filtered by `RUST_LOG`, falling back to
/// `default_directive` (e.g. `"bayes_tree=debug"`).
///
/// Returns `false` if a global subscriber was already installed.
pub fn init_tracing(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Create a construction span.
#[macro_export]
macro_rules! build_span {
    ($conditionals:expr) => {
        tracing::debug_span!("bayes_tree.build", conditionals = $conditionals)
    };
}

/// Create a query span.
#[macro_export]
macro_rules! query_span {
    ($kind:expr, $key:expr) => {
        tracing::debug_span!("bayes_tree.query", kind = %$kind, key = $key)
    };
}

/// Create a maintenance span.
#[macro_export]
macro_rules! maintenance_span {
    ($kind:expr, $count:expr) => {
        tracing::debug_span!("bayes_tree.maintenance", kind = %$kind, count = $count)
    };
}

/// Span names as constants for programmatic use.
pub mod names {
    pub const BUILD: &str = "bayes_tree.build";
    pub const QUERY: &str = "bayes_tree.query";
    pub const MAINTENANCE: &str = "bayes_tree.maintenance";
}
