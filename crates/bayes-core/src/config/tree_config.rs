//! Tree configuration with layered resolution.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::{CONFIG_FILE_NAME, DEFAULT_EQUALITY_TOLERANCE, ENV_PREFIX};
use crate::errors::ConfigError;

/// Behavioural knobs of a Bayes tree.
///
/// Resolution order (highest priority first):
/// 1. Environment variables (`BAYES_TREE_*`)
/// 2. Project config (`bayes_tree.toml` in the given root)
/// 3. Compiled defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    /// Tolerance used by `equals` when no explicit tolerance is given. Default: 1e-9.
    pub equality_tolerance: f64,
    /// Memoize shortcuts on the cliques they were computed for. Default: true.
    pub cache_shortcuts: bool,
    /// Run the full structural validation after every mutation. Default: false.
    pub validate_after_mutation: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            equality_tolerance: DEFAULT_EQUALITY_TOLERANCE,
            cache_shortcuts: true,
            validate_after_mutation: false,
        }
    }
}

impl TreeConfig {
    /// Load configuration from `root/bayes_tree.toml` (if present) and the environment.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let project_config_path = root.join(CONFIG_FILE_NAME);
        if project_config_path.exists() {
            let content = std::fs::read_to_string(&project_config_path).map_err(|_| {
                ConfigError::FileNotFound {
                    path: project_config_path.display().to_string(),
                }
            })?;
            config = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: project_config_path.display().to_string(),
                message: e.to_string(),
            })?;
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.equality_tolerance.is_finite() || self.equality_tolerance < 0.0 {
            return Err(ConfigError::ValidationFailed {
                field: "equality_tolerance".to_string(),
                message: "must be finite and non-negative".to_string(),
            });
        }
        Ok(())
    }

    /// Apply environment variable overrides.
    /// Pattern: `BAYES_TREE_EQUALITY_TOLERANCE`, `BAYES_TREE_CACHE_SHORTCUTS`, etc.
    /// Unparseable values are ignored.
    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_value::<f64>("EQUALITY_TOLERANCE") {
            self.equality_tolerance = v;
        }
        if let Some(v) = env_value::<bool>("CACHE_SHORTCUTS") {
            self.cache_shortcuts = v;
        }
        if let Some(v) = env_value::<bool>("VALIDATE_AFTER_MUTATION") {
            self.validate_after_mutation = v;
        }
    }
}

fn env_value<T: std::str::FromStr>(suffix: &str) -> Option<T> {
    std::env::var(format!("{ENV_PREFIX}{suffix}"))
        .ok()
        .and_then(|val| val.parse::<T>().ok())
}
