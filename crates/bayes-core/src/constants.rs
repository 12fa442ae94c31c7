/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tolerance for conditional and tree equality.
pub const DEFAULT_EQUALITY_TOLERANCE: f64 = 1e-9;

/// Version tag written into every persisted tree snapshot.
pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

/// Project-level config file name.
pub const CONFIG_FILE_NAME: &str = "bayes_tree.toml";

/// Prefix of the environment variables that override config values.
pub const ENV_PREFIX: &str = "BAYES_TREE_";
