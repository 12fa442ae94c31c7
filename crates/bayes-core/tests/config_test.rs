//! Tests for the tree configuration system.

use std::sync::Mutex;

use bayes_core::config::TreeConfig;
use bayes_core::errors::ConfigError;

/// Global mutex to serialize tests that modify environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

fn clear_env_vars() {
    for key in [
        "BAYES_TREE_EQUALITY_TOLERANCE",
        "BAYES_TREE_CACHE_SHORTCUTS",
        "BAYES_TREE_VALIDATE_AFTER_MUTATION",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn config_loads_from_empty_toml_with_all_defaults() {
    let config = TreeConfig::from_toml("").unwrap();
    assert_eq!(config.equality_tolerance, 1e-9);
    assert!(config.cache_shortcuts);
    assert!(!config.validate_after_mutation);
}

#[test]
fn config_loads_partial_toml_with_overrides() {
    let config = TreeConfig::from_toml("cache_shortcuts = false\n").unwrap();
    assert!(!config.cache_shortcuts);
    // Non-overridden fields keep defaults
    assert_eq!(config.equality_tolerance, 1e-9);
}

#[test]
fn config_rejects_negative_tolerance() {
    let err = TreeConfig::from_toml("equality_tolerance = -1.0\n").unwrap_err();
    assert!(matches!(err, ConfigError::ValidationFailed { ref field, .. } if field == "equality_tolerance"));
}

#[test]
fn config_rejects_malformed_toml() {
    let err = TreeConfig::from_toml("cache_shortcuts = [").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn config_serde_roundtrip() {
    let config = TreeConfig {
        equality_tolerance: 1e-6,
        cache_shortcuts: false,
        validate_after_mutation: true,
    };
    let toml_str = config.to_toml().unwrap();
    let roundtripped = TreeConfig::from_toml(&toml_str).unwrap();
    assert_eq!(roundtripped, config);
}

#[test]
fn load_reads_project_file_then_env() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("bayes_tree.toml"),
        "equality_tolerance = 0.001\ncache_shortcuts = false\n",
    )
    .unwrap();

    let config = TreeConfig::load(dir.path()).unwrap();
    assert_eq!(config.equality_tolerance, 0.001);
    assert!(!config.cache_shortcuts);

    std::env::set_var("BAYES_TREE_CACHE_SHORTCUTS", "true");
    std::env::set_var("BAYES_TREE_VALIDATE_AFTER_MUTATION", "not-a-bool");
    let config = TreeConfig::load(dir.path()).unwrap();
    assert!(config.cache_shortcuts, "env should override the project file");
    assert!(!config.validate_after_mutation, "unparseable env values are ignored");

    clear_env_vars();
}

#[test]
fn load_without_project_file_uses_defaults() {
    let _lock = ENV_MUTEX.lock().unwrap();
    clear_env_vars();

    let dir = tempfile::TempDir::new().unwrap();
    let config = TreeConfig::load(dir.path()).unwrap();
    assert_eq!(config, TreeConfig::default());
}
