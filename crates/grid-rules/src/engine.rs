//! Threshold-bound validator.
//!
//! `Validator` applies the pure checks from `validate` with the limits from a
//! `RuleConfig`, so call sites do not repeat the thresholds.

use tracing::debug;

use grid_contracts::violation::RuleViolation;

use crate::{
    config::RuleConfig,
    validate::{
        validate_core_temperature, validate_path_with_prefix, validate_task_id,
        validate_task_title, validate_temperature, validate_weight_in,
    },
};

#[derive(Debug, Clone, Default)]
pub struct Validator {
    config: RuleConfig,
}

impl Validator {
    pub fn new(config: RuleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RuleConfig {
        &self.config
    }

    pub fn check_path(&self, path: &str) -> Result<(), RuleViolation> {
        validate_path_with_prefix(path, &self.config.path_prefix)
    }

    pub fn check_cold_chain(&self, value: f64) -> Result<(), RuleViolation> {
        debug!(value, max = self.config.cold_chain_max_celsius, "checking cold chain");
        validate_temperature(value, self.config.cold_chain_max_celsius)
    }

    pub fn check_core(&self, value: f64) -> Result<(), RuleViolation> {
        debug!(value, min = self.config.core_min_celsius, "checking core temperature");
        validate_core_temperature(value, self.config.core_min_celsius)
    }

    pub fn check_weight(&self, weight: u32) -> Result<(), RuleViolation> {
        validate_weight_in(weight, self.config.weight_min, self.config.weight_max)
    }

    /// Same order as `validate::validate_task`, but with configured weight limits.
    pub fn check_task(&self, id: &str, title: &str, weight: u32) -> Result<(), RuleViolation> {
        validate_task_id(id)?;
        validate_task_title(title)?;
        self.check_weight(weight)
    }
}
