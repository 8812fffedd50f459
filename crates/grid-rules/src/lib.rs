//! # grid-rules
//!
//! Pure HACCP rule validators for the gastro-grid kernel.
//!
//! ## Overview
//!
//! Each validator maps its inputs to `Ok(())` or a [`RuleViolation`] tagged
//! with a stable rule id (`HACCP-Rnn` for general rules, `HACCP-CCP-nn` for
//! critical control points). Validators never fail silently and never do I/O;
//! the caller audits the outcome.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use grid_rules::{validate_temperature, Validator, RuleConfig};
//!
//! validate_temperature(6.5, 7.0)?;
//! let validator = Validator::new(RuleConfig::from_file(Path::new("grid.toml"))?);
//! validator.check_core(74.0)?;
//! ```
//!
//! [`RuleViolation`]: grid_contracts::violation::RuleViolation

pub mod config;
pub mod engine;
pub mod rule;
pub mod validate;

pub use config::RuleConfig;
pub use engine::Validator;
pub use rule::is_valid_rule_id_format;
pub use validate::{
    validate_core_temperature, validate_path, validate_task, validate_task_completion,
    validate_task_id, validate_task_title, validate_temperature, validate_weight, TaskStatus,
};

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use grid_contracts::error::GridError;

    use super::*;

    // ── 1. temperature boundaries ─────────────────────────────────────────────

    #[test]
    fn test_cold_chain_upper_bound_is_inclusive() {
        assert!(validate_temperature(7.0, 7.0).is_ok());
        let v = validate_temperature(7.1, 7.0).unwrap_err();
        assert_eq!(v.rule_id, "HACCP-CCP-02");
        assert!(v.reason.contains("7.1"), "unexpected reason: {}", v.reason);
    }

    #[test]
    fn test_core_lower_bound_is_inclusive() {
        assert!(validate_core_temperature(72.0, 72.0).is_ok());
        let v = validate_core_temperature(71.9, 72.0).unwrap_err();
        assert_eq!(v.rule_id, "HACCP-CCP-01");
    }

    #[test]
    fn test_temperature_checks_are_directional() {
        // A very cold reading is fine for the cold chain but fails cooking.
        assert!(validate_temperature(-18.0, 7.0).is_ok());
        assert!(validate_core_temperature(-18.0, 72.0).is_err());
        // A very hot reading passes cooking but breaks the cold chain.
        assert!(validate_core_temperature(95.0, 72.0).is_ok());
        assert!(validate_temperature(95.0, 7.0).is_err());
    }

    #[test]
    fn test_nan_reading_is_rejected() {
        assert_eq!(validate_temperature(f64::NAN, 7.0).unwrap_err().rule_id, "HACCP-CCP-02");
        assert_eq!(
            validate_core_temperature(f64::NAN, 72.0).unwrap_err().rule_id,
            "HACCP-CCP-01"
        );
    }

    #[test]
    fn test_nan_threshold_fails_closed() {
        assert!(validate_temperature(2.0, f64::NAN).is_err());
        assert!(validate_core_temperature(90.0, f64::NAN).is_err());
    }

    // ── 2. paths ──────────────────────────────────────────────────────────────

    #[test]
    fn test_path_rules() {
        assert!(validate_path("^fridge.1").is_ok());

        for bad in ["", "fridge.1", "^fridge 1", "^fridge\t1"] {
            let v = validate_path(bad).unwrap_err();
            assert_eq!(v.rule_id, "HACCP-R01", "path {:?}", bad);
            assert_eq!(v.fields, vec!["path".to_string()]);
        }
    }

    // ── 3. tasks ──────────────────────────────────────────────────────────────

    #[test]
    fn test_weight_range() {
        assert!(validate_weight(1).is_ok());
        assert!(validate_weight(100).is_ok());
        assert_eq!(validate_weight(0).unwrap_err().rule_id, "HACCP-R04");
        assert_eq!(validate_weight(101).unwrap_err().rule_id, "HACCP-R04");
    }

    #[test]
    fn test_validate_task_reports_first_failure() {
        assert!(validate_task("t-1", "Clean fryer", 10).is_ok());
        assert_eq!(validate_task("", "", 0).unwrap_err().rule_id, "HACCP-R02");
        assert_eq!(validate_task("t-1", "  ", 0).unwrap_err().rule_id, "HACCP-R03");
        assert_eq!(validate_task("t-1", "Clean fryer", 0).unwrap_err().rule_id, "HACCP-R04");
    }

    #[test]
    fn test_task_completion_requires_open_status() {
        assert!(validate_task_completion("Clean fryer", TaskStatus::Open).is_ok());
        assert_eq!(
            validate_task_completion("Clean fryer", TaskStatus::Done).unwrap_err().rule_id,
            "HACCP-R05"
        );
        assert_eq!(
            validate_task_completion("", TaskStatus::Open).unwrap_err().rule_id,
            "HACCP-R03"
        );
    }

    // ── 4. rule id format ─────────────────────────────────────────────────────

    #[test]
    fn test_rule_id_format() {
        for ok in ["HACCP-R01", "HACCP-R99", "HACCP-CCP-02", "HACCP-CCP-00"] {
            assert!(is_valid_rule_id_format(ok), "{ok} should be accepted");
        }
        for bad in [
            "HACCP-R1",
            "haccp-r01",
            "HACCP-CCP-002",
            "HACCP-R001",
            "HACCP-CCP02",
            " HACCP-R01",
            "HACCP-R01\n",
            "HACCP-R٠١",
            "",
        ] {
            assert!(!is_valid_rule_id_format(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn test_all_rule_constants_are_well_formed() {
        for id in [
            rule::INVALID_PATH,
            rule::MISSING_TASK_ID,
            rule::MISSING_TITLE,
            rule::WEIGHT_OUT_OF_RANGE,
            rule::INVALID_TASK_STATUS,
            rule::INVALID_SOP_VERSION,
            rule::CORE_TEMPERATURE,
            rule::COLD_CHAIN,
        ] {
            assert!(is_valid_rule_id_format(id), "{id}");
        }
    }

    // ── 5. configuration ──────────────────────────────────────────────────────

    #[test]
    fn test_empty_toml_yields_defaults() {
        let config = RuleConfig::from_toml_str("").unwrap();
        assert_eq!(config, RuleConfig::default());
    }

    #[test]
    fn test_configured_thresholds_are_applied() {
        let config = RuleConfig::from_toml_str(
            r#"
            cold_chain_max_celsius = 4.0
            core_min_celsius = 75.0
            weight_max = 10
            path_prefix = "@"
        "#,
        )
        .unwrap();
        let validator = Validator::new(config);

        assert!(validator.check_cold_chain(4.0).is_ok());
        assert!(validator.check_cold_chain(5.0).is_err());
        assert!(validator.check_core(74.0).is_err());
        assert!(validator.check_weight(11).is_err());
        assert!(validator.check_path("@shelf").is_ok());
        assert!(validator.check_path("^shelf").is_err());
        assert_eq!(validator.check_task("t", "x", 11).unwrap_err().rule_id, "HACCP-R04");
    }

    #[test]
    fn test_inconsistent_weights_rejected() {
        let err = RuleConfig::from_toml_str("weight_min = 50\nweight_max = 10").unwrap_err();
        assert!(matches!(err, GridError::ConfigError { .. }));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = RuleConfig::from_toml_str("freezer_max = -18.0").unwrap_err();
        match err {
            GridError::ConfigError { reason } => assert!(reason.contains("rule TOML")),
            other => panic!("expected ConfigError, got {:?}", other),
        }
    }
}
