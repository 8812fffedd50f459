//! Rule thresholds loaded from TOML.
//!
//! Every field has a default, so an empty document (or a missing `[rules]`
//! table in the CLI config) yields the standard HACCP limits.
//!
//! ```toml
//! cold_chain_max_celsius = 7.0
//! core_min_celsius = 72.0
//! weight_min = 1
//! weight_max = 100
//! path_prefix = "^"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use grid_contracts::error::{GridError, GridResult};

use crate::validate::{PATH_PREFIX, WEIGHT_MAX, WEIGHT_MIN};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuleConfig {
    /// Inclusive upper bound for cold storage readings.
    pub cold_chain_max_celsius: f64,
    /// Inclusive lower bound for cooking core temperatures.
    pub core_min_celsius: f64,
    pub weight_min: u32,
    pub weight_max: u32,
    pub path_prefix: String,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            cold_chain_max_celsius: 7.0,
            core_min_celsius: 72.0,
            weight_min: WEIGHT_MIN,
            weight_max: WEIGHT_MAX,
            path_prefix: PATH_PREFIX.to_string(),
        }
    }
}

impl RuleConfig {
    /// Parse `s` as TOML and validate the result.
    ///
    /// Returns `GridError::ConfigError` on malformed TOML, unknown keys, or
    /// inconsistent values.
    pub fn from_toml_str(s: &str) -> GridResult<Self> {
        let config: RuleConfig = toml::from_str(s).map_err(|e| GridError::ConfigError {
            reason: format!("failed to parse rule TOML: {}", e),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read the file at `path` and parse it as rule configuration.
    pub fn from_file(path: &Path) -> GridResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| GridError::ConfigError {
            reason: format!("failed to read rule file '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }

    pub fn validate(&self) -> GridResult<()> {
        if self.weight_min > self.weight_max {
            return Err(GridError::ConfigError {
                reason: format!(
                    "weight_min {} is greater than weight_max {}",
                    self.weight_min, self.weight_max
                ),
            });
        }
        if self.path_prefix.is_empty() {
            return Err(GridError::ConfigError {
                reason: "path_prefix must not be empty".to_string(),
            });
        }
        if !self.cold_chain_max_celsius.is_finite() || !self.core_min_celsius.is_finite() {
            return Err(GridError::ConfigError {
                reason: "temperature thresholds must be finite".to_string(),
            });
        }
        Ok(())
    }
}
