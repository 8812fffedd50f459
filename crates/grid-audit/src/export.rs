//! Sealed exports of the audit trail.

use chrono::Utc;
use tracing::{info, warn};

use grid_contracts::{
    audit::{AuditAction, AuditDraft, AuditLogEntry, AuditResult},
    error::GridResult,
    integrity::AuditExport,
};
use grid_core::traits::AuditTrail;

use crate::{
    chain::{verify_chain, ChainVerdict},
    seal::ExportSeal,
};

/// Export every entry of `trail` as sealed JSON and audit the export.
///
/// The payload holds the entries present before the export; the
/// `EXPORT_CREATED` entry appended afterwards records the shortened seal.
/// Callers that still have to deliver the payload somewhere should use
/// `build_export` and `record_export` around the delivery instead.
pub fn export_trail(trail: &dyn AuditTrail, actor_id: Option<&str>) -> GridResult<AuditExport> {
    let export = build_export(trail)?;
    record_export(trail, &export, actor_id, AuditResult::Ok, None)?;
    Ok(export)
}

/// Snapshot and seal every entry of `trail` without auditing anything.
pub fn build_export(trail: &dyn AuditTrail) -> GridResult<AuditExport> {
    let entries = trail.fetch_all_entries()?;
    let payload = serde_json::to_string(&entries)?;
    let seal = ExportSeal::generate(&payload);
    let terminal_hash = entries
        .last()
        .map(|e| e.chain_hash.clone())
        .unwrap_or_default();

    Ok(AuditExport {
        exported_at: Utc::now(),
        entry_count: entries.len(),
        terminal_hash,
        payload,
        seal,
    })
}

/// Append the `EXPORT_CREATED` entry for `export`.
///
/// `result` is `Fail` when the payload could not be delivered; `failure`
/// is then appended to the reason.
pub fn record_export(
    trail: &dyn AuditTrail,
    export: &AuditExport,
    actor_id: Option<&str>,
    result: AuditResult,
    failure: Option<&str>,
) -> GridResult<AuditLogEntry> {
    let draft = match actor_id {
        Some(actor) => AuditDraft::user(actor, AuditAction::ExportCreated),
        None => AuditDraft::system(AuditAction::ExportCreated),
    };
    let mut reason = format!("seal {}", ExportSeal::shortened(&export.seal));
    if let Some(failure) = failure {
        reason.push_str(": ");
        reason.push_str(failure);
    }
    let entry = trail.append(draft.with_result(result).with_reason(reason))?;

    match result {
        AuditResult::Ok => {
            info!(entries = export.entry_count, seal = %export.seal, "audit export created")
        }
        _ => warn!(entries = export.entry_count, seal = %export.seal, "audit export failed"),
    }
    Ok(entry)
}

/// What a downstream check of an exported payload found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportInspection {
    /// The payload still matches its seal.
    pub seal_ok: bool,
    /// Chain verification of the entries inside the payload.
    pub chain: ChainVerdict,
    pub entry_count: usize,
}

/// Check an exported payload against its seal and re-verify its chain.
///
/// Returns `GridError::Serialization` if the payload is not an entry array.
pub fn inspect_export(payload: &str, seal: &str) -> GridResult<ExportInspection> {
    let seal_ok = ExportSeal::verify(payload, seal);
    let entries: Vec<AuditLogEntry> = serde_json::from_str(payload)?;
    let chain = verify_chain(&entries)?;
    Ok(ExportInspection {
        seal_ok,
        chain,
        entry_count: entries.len(),
    })
}
