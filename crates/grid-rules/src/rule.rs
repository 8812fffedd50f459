//! HACCP rule identifiers.
//!
//! Rule ids are stable: they are written into audit entries and must keep
//! their meaning across releases. General rules are `HACCP-Rnn`, critical
//! control points are `HACCP-CCP-nn`.

use std::sync::OnceLock;

use regex::Regex;

/// Object path is empty, lacks the sentinel prefix, or contains whitespace.
pub const INVALID_PATH: &str = "HACCP-R01";
/// Task id is empty.
pub const MISSING_TASK_ID: &str = "HACCP-R02";
/// Task title is empty.
pub const MISSING_TITLE: &str = "HACCP-R03";
/// Task weight outside the allowed range.
pub const WEIGHT_OUT_OF_RANGE: &str = "HACCP-R04";
/// Task completion attempted from a status other than open.
pub const INVALID_TASK_STATUS: &str = "HACCP-R05";
/// SOP version input rejected (empty key or duplicate version).
pub const INVALID_SOP_VERSION: &str = "HACCP-R06";
/// Core temperature below the cooking minimum.
pub const CORE_TEMPERATURE: &str = "HACCP-CCP-01";
/// Cold-chain temperature above the storage maximum.
pub const COLD_CHAIN: &str = "HACCP-CCP-02";

const RULE_ID_PATTERN: &str = r"^HACCP-(R\d{2}|CCP-\d{2})$";

fn rule_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RULE_ID_PATTERN).expect("rule id pattern must compile"))
}

/// Return true if `s` is a well-formed rule id (`HACCP-R01`, `HACCP-CCP-02`, ...).
///
/// Matching is exact and case-sensitive: `HACCP-R1`, `haccp-r01` and
/// `HACCP-CCP-002` are all rejected. `\d` is restricted to ASCII digits.
pub fn is_valid_rule_id_format(s: &str) -> bool {
    s.is_ascii() && rule_id_regex().is_match(s)
}
