//! SOP document records.
//!
//! A `SopDocument` is one version of a Standard Operating Procedure. All
//! versions sharing a `sop_id` form its history; at most one is `Active`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle state of a SOP version. The only transition is `Active -> Archived`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SopStatus {
    Active,
    Archived,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SopDocument {
    pub id: Uuid,
    /// Business key, stable across versions.
    pub sop_id: String,
    pub title: String,
    /// Dotted version string, e.g. "1.4".
    pub version: String,
    pub status: SopStatus,
    pub valid_from: DateTime<Utc>,
    pub approved_by: Option<String>,
    /// Hex SHA-256 over the document's identifying content.
    pub checksum: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SopDocument {
    pub fn is_active(&self) -> bool {
        self.status == SopStatus::Active
    }
}

/// Input for `SopRegistry::create_new_version`.
#[derive(Debug, Clone)]
pub struct NewSopVersion {
    pub sop_id: String,
    pub title: String,
    pub version: String,
    pub approved_by: Option<String>,
    /// Defaults to the creation time when `None`.
    pub valid_from: Option<DateTime<Utc>>,
}

impl NewSopVersion {
    pub fn new(
        sop_id: impl Into<String>,
        title: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            sop_id: sop_id.into(),
            title: title.into(),
            version: version.into(),
            approved_by: None,
            valid_from: None,
        }
    }

    pub fn approved_by(mut self, approver: impl Into<String>) -> Self {
        self.approved_by = Some(approver.into());
        self
    }

    pub fn valid_from(mut self, at: DateTime<Utc>) -> Self {
        self.valid_from = Some(at);
        self
    }
}
