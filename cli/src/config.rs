//! CLI configuration file.
//!
//! `grid.toml` in the data directory is optional. An explicit `--config`
//! path must exist.
//!
//! ```toml
//! [rules]
//! cold_chain_max_celsius = 4.0
//! core_min_celsius = 75.0
//! ```

use std::path::Path;

use serde::Deserialize;

use grid_contracts::error::{GridError, GridResult};
use grid_rules::RuleConfig;

pub const CONFIG_FILE: &str = "grid.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub rules: RuleConfig,
}

impl GridConfig {
    pub fn from_toml_str(s: &str) -> GridResult<Self> {
        let config: GridConfig = toml::from_str(s).map_err(|e| GridError::ConfigError {
            reason: format!("failed to parse config TOML: {}", e),
        })?;
        config.rules.validate()?;
        Ok(config)
    }

    /// Load `explicit` if given, else `<data_dir>/grid.toml` if present, else defaults.
    pub fn load(explicit: Option<&Path>, data_dir: &Path) -> GridResult<Self> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = data_dir.join(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = std::fs::read_to_string(&path).map_err(|e| GridError::ConfigError {
            reason: format!("failed to read config '{}': {}", path.display(), e),
        })?;
        Self::from_toml_str(&contents)
    }
}
