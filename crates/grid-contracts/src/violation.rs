//! Rule violations produced by the HACCP validators.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Maximum number of characters kept in `RuleViolation::reason`.
pub const MAX_REASON_CHARS: usize = 120;

/// A failed rule check: stable rule id plus a short human-readable reason.
///
/// Not persisted directly. Call sites turn it into a `SAVE_DENIED` audit entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleViolation {
    pub rule_id: String,
    /// At most `MAX_REASON_CHARS` characters.
    pub reason: String,
    /// Names of the offending input fields, if known.
    #[serde(default)]
    pub fields: Vec<String>,
}

impl RuleViolation {
    /// Build a violation, truncating `reason` to `MAX_REASON_CHARS` characters.
    pub fn new(rule_id: impl Into<String>, reason: impl AsRef<str>) -> Self {
        Self {
            rule_id: rule_id.into(),
            reason: truncate_chars(reason.as_ref(), MAX_REASON_CHARS),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.fields.push(field.into());
        self
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.rule_id, self.reason)
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}
