//! Pure HACCP validators.
//!
//! Every function maps its inputs to `Ok(())` or a `RuleViolation` carrying a
//! stable rule id. No I/O, no state: callers decide how to audit the outcome
//! (normally through `grid_core::Gatekeeper`).

use serde::{Deserialize, Serialize};

use grid_contracts::violation::RuleViolation;

use crate::rule;

/// Sentinel every object path must start with.
pub const PATH_PREFIX: &str = "^";
/// Inclusive bounds for task weights.
pub const WEIGHT_MIN: u32 = 1;
pub const WEIGHT_MAX: u32 = 100;

/// Status of a kitchen task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

/// Validate an object path against the default `^` prefix.
pub fn validate_path(path: &str) -> Result<(), RuleViolation> {
    validate_path_with_prefix(path, PATH_PREFIX)
}

/// Validate an object path: non-empty, starts with `prefix`, no whitespace.
pub fn validate_path_with_prefix(path: &str, prefix: &str) -> Result<(), RuleViolation> {
    if path.is_empty() {
        return Err(RuleViolation::new(rule::INVALID_PATH, "path is empty").with_field("path"));
    }
    if !path.starts_with(prefix) {
        return Err(RuleViolation::new(
            rule::INVALID_PATH,
            format!("path '{}' must start with '{}'", path, prefix),
        )
        .with_field("path"));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(RuleViolation::new(
            rule::INVALID_PATH,
            format!("path '{}' contains whitespace", path),
        )
        .with_field("path"));
    }
    Ok(())
}

pub fn validate_task_id(id: &str) -> Result<(), RuleViolation> {
    if id.trim().is_empty() {
        return Err(RuleViolation::new(rule::MISSING_TASK_ID, "task id is empty").with_field("id"));
    }
    Ok(())
}

pub fn validate_task_title(title: &str) -> Result<(), RuleViolation> {
    if title.trim().is_empty() {
        return Err(
            RuleViolation::new(rule::MISSING_TITLE, "task title is empty").with_field("title")
        );
    }
    Ok(())
}

/// Validate a task weight against the default `[1, 100]` range.
pub fn validate_weight(weight: u32) -> Result<(), RuleViolation> {
    validate_weight_in(weight, WEIGHT_MIN, WEIGHT_MAX)
}

/// Validate a task weight against an inclusive `[min, max]` range.
pub fn validate_weight_in(weight: u32, min: u32, max: u32) -> Result<(), RuleViolation> {
    if weight < min || weight > max {
        return Err(RuleViolation::new(
            rule::WEIGHT_OUT_OF_RANGE,
            format!("weight {} outside [{}, {}]", weight, min, max),
        )
        .with_field("weight"));
    }
    Ok(())
}

/// Validate a task definition. Reports the first failing check in the order
/// id, title, weight.
pub fn validate_task(id: &str, title: &str, weight: u32) -> Result<(), RuleViolation> {
    validate_task_id(id)?;
    validate_task_title(title)?;
    validate_weight(weight)
}

/// A task may only be completed when it has a title and is still open.
pub fn validate_task_completion(title: &str, prior: TaskStatus) -> Result<(), RuleViolation> {
    validate_task_title(title)?;
    if prior != TaskStatus::Open {
        return Err(RuleViolation::new(
            rule::INVALID_TASK_STATUS,
            format!("task must be open to complete, found {:?}", prior),
        )
        .with_field("status"));
    }
    Ok(())
}

/// Cold-chain check: `value` must not exceed `max_allowed` (inclusive bound).
///
/// A non-finite reading is treated as a violation of the same rule, and a NaN
/// bound rejects every reading.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn validate_temperature(value: f64, max_allowed: f64) -> Result<(), RuleViolation> {
    if !value.is_finite() {
        return Err(
            RuleViolation::new(rule::COLD_CHAIN, "temperature reading is not a number")
                .with_field("value"),
        );
    }
    if !(value <= max_allowed) {
        return Err(RuleViolation::new(
            rule::COLD_CHAIN,
            format!("{:.1} °C exceeds cold-chain maximum {:.1} °C", value, max_allowed),
        )
        .with_field("value"));
    }
    Ok(())
}

/// Cooking check: core temperature must reach `min_required` (inclusive bound).
///
/// A non-finite reading is treated as a violation of the same rule, and a NaN
/// bound rejects every reading.
#[allow(clippy::neg_cmp_op_on_partial_ord)]
pub fn validate_core_temperature(value: f64, min_required: f64) -> Result<(), RuleViolation> {
    if !value.is_finite() {
        return Err(RuleViolation::new(
            rule::CORE_TEMPERATURE,
            "core temperature reading is not a number",
        )
        .with_field("value"));
    }
    if !(value >= min_required) {
        return Err(RuleViolation::new(
            rule::CORE_TEMPERATURE,
            format!("core {:.1} °C below required {:.1} °C", value, min_required),
        )
        .with_field("value"));
    }
    Ok(())
}
