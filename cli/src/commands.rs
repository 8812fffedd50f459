//! Subcommand implementations.
//!
//! Each command writes human-readable output to `out` so tests can capture
//! it; `main` passes stdout.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use clap::{Subcommand, ValueEnum};

use grid_audit::{build_export, inspect_export, record_export, ExportSeal};
use grid_contracts::{
    audit::{AuditAction, AuditDraft, AuditLogEntry, AuditResult},
    error::{GridError, GridResult},
    integrity::IntegrityCheckResult,
    sop::{NewSopVersion, SopDocument},
};
use grid_core::persist::write_atomic;
use grid_rules::{is_valid_rule_id_format, validate_task_completion, TaskStatus};

use crate::kernel::Kernel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TempKind {
    /// Cold-chain storage reading (upper bound).
    Cold,
    /// Cooking core temperature (lower bound).
    Core,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    Open,
    InProgress,
    Done,
}

impl From<StatusArg> for TaskStatus {
    fn from(s: StatusArg) -> Self {
        match s {
            StatusArg::Open => TaskStatus::Open,
            StatusArg::InProgress => TaskStatus::InProgress,
            StatusArg::Done => TaskStatus::Done,
        }
    }
}

/// Actions an operator may record by hand. Denials, integrity checks,
/// exports and SOP changes are only written by the commands that perform them.
const LOGGABLE_ACTIONS: [AuditAction; 2] =
    [AuditAction::SaveAccepted, AuditAction::TaskCompleted];

fn parse_action(s: &str) -> Result<AuditAction, String> {
    AuditAction::parse(s)
        .filter(|a| LOGGABLE_ACTIONS.contains(a))
        .ok_or_else(|| {
            let known: Vec<&str> = LOGGABLE_ACTIONS.iter().map(|a| a.as_str()).collect();
            format!("action '{}' cannot be logged, expected one of {}", s, known.join(", "))
        })
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Append a SAVE_ACCEPTED or TASK_COMPLETED entry. A given --key is
    /// checked against the path rule.
    Log {
        #[arg(long)]
        actor: String,
        #[arg(long, value_parser = parse_action)]
        action: AuditAction,
        #[arg(long)]
        key: Option<String>,
        #[arg(long)]
        reason: Option<String>,
    },
    /// Validate a temperature reading; denials are audited as SAVE_DENIED.
    CheckTemp {
        #[arg(long, value_enum)]
        kind: TempKind,
        #[arg(long, allow_negative_numbers = true)]
        value: f64,
        #[arg(long)]
        key: Option<String>,
        #[arg(long, default_value = "system")]
        actor: String,
    },
    /// Validate and record a task definition.
    Task {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        weight: u32,
        #[arg(long, default_value = "system")]
        actor: String,
    },
    /// Record completion of a task, given its current status.
    CompleteTask {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: String,
        #[arg(long, value_enum)]
        status: StatusArg,
        #[arg(long, default_value = "system")]
        actor: String,
    },
    /// Print every audit entry, oldest first.
    Entries,
    /// Verify the audit chain and persist the result.
    Verify,
    /// Print the result of the last integrity check.
    LastCheck,
    /// Write a sealed export of the trail to <OUT> and its seal to <OUT>.sha256.
    Export {
        #[arg(long)]
        out: PathBuf,
        #[arg(long)]
        actor: Option<String>,
    },
    /// Check an exported payload against a seal.
    VerifyExport {
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        seal: String,
    },
    /// Create a new active SOP version, archiving the current one.
    SopNew {
        #[arg(long)]
        sop_id: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        version: String,
        #[arg(long)]
        approved_by: Option<String>,
    },
    /// List all SOP versions.
    SopList,
    /// Show the active version of a SOP.
    SopActive {
        #[arg(long)]
        sop_id: String,
    },
    /// Archive every active version of a SOP.
    SopArchive {
        #[arg(long)]
        sop_id: String,
    },
    /// Check whether a string is a well-formed HACCP rule id.
    RuleId { id: String },
}

pub fn run(kernel: &Kernel, command: Command, out: &mut dyn Write) -> GridResult<()> {
    match command {
        Command::Log {
            actor,
            action,
            key,
            reason,
        } => {
            let mut draft = AuditDraft::user(actor, action);
            if let Some(reason) = reason {
                draft = draft.with_reason(reason);
            }
            let check = match &key {
                Some(k) => kernel.validator.check_path(k),
                None => Ok(()),
            };
            if let Some(k) = key {
                draft = draft.with_key(k);
            }
            let entry = kernel.gate.guard(draft, check)?;
            print_entry(out, &entry)
        }

        Command::CheckTemp {
            kind,
            value,
            key,
            actor,
        } => {
            let check = match kind {
                TempKind::Cold => kernel.validator.check_cold_chain(value),
                TempKind::Core => kernel.validator.check_core(value),
            };
            let label = match kind {
                TempKind::Cold => "cold chain",
                TempKind::Core => "core",
            };
            let mut draft = AuditDraft::user(actor, AuditAction::SaveAccepted)
                .with_reason(format!("{} reading {:.1} °C", label, value));
            if let Some(k) = key {
                draft = draft.with_key(k);
            }
            let entry = kernel.gate.guard(draft, check)?;
            print_entry(out, &entry)
        }

        Command::Task {
            id,
            title,
            weight,
            actor,
        } => {
            let check = kernel.validator.check_task(&id, &title, weight);
            let draft = AuditDraft::user(actor, AuditAction::SaveAccepted)
                .with_key(format!("^tasks.{}", id))
                .with_reason(format!("task '{}' weight {}", title, weight));
            let entry = kernel.gate.guard(draft, check)?;
            print_entry(out, &entry)
        }

        Command::CompleteTask {
            id,
            title,
            status,
            actor,
        } => {
            let check = validate_task_completion(&title, status.into());
            let draft = AuditDraft::user(actor, AuditAction::TaskCompleted)
                .with_key(format!("^tasks.{}", id))
                .with_reason(format!("task '{}' completed", title));
            let entry = kernel.gate.guard(draft, check)?;
            print_entry(out, &entry)
        }

        Command::Entries => {
            for entry in kernel.trail.fetch_all_entries()? {
                print_entry(out, &entry)?;
            }
            Ok(())
        }

        Command::Verify => {
            let handle = kernel.verifier.spawn_check()?;
            let result = handle.join().map_err(|_| GridError::AuditReadFailed {
                reason: "integrity check thread panicked".to_string(),
            })??;
            print_check(out, &result)
        }

        Command::LastCheck => match kernel.verifier.last_result()? {
            Some(result) => print_check(out, &result),
            None => emit(out, format_args!("no integrity check has run yet\n")),
        },

        Command::Export { out: path, actor } => {
            let trail = kernel.trail.as_ref();
            let export = build_export(trail)?;
            let written = write_file(&path, export.payload.as_bytes()).and_then(|()| {
                write_file(&seal_path(&path), format!("{}\n", export.seal).as_bytes())
            });
            if let Err(e) = written {
                record_export(
                    trail,
                    &export,
                    actor.as_deref(),
                    AuditResult::Fail,
                    Some(&e.to_string()),
                )?;
                return Err(e);
            }
            record_export(trail, &export, actor.as_deref(), AuditResult::Ok, None)?;
            emit(
                out,
                format_args!(
                    "exported {} entries to {}\nseal {}\n",
                    export.entry_count,
                    path.display(),
                    export.seal
                ),
            )
        }

        Command::VerifyExport { payload, seal } => {
            let contents =
                std::fs::read_to_string(&payload).map_err(|e| GridError::AuditReadFailed {
                    reason: format!("failed to read '{}': {}", payload.display(), e),
                })?;
            let inspection = inspect_export(&contents, seal.trim())?;
            emit(
                out,
                format_args!(
                    "seal {}: {}\nchain: {} ({} entries)\n",
                    ExportSeal::shortened(seal.trim()),
                    if inspection.seal_ok { "match" } else { "MISMATCH" },
                    if inspection.chain.is_valid { "intact" } else { "deviation found" },
                    inspection.entry_count
                ),
            )?;
            if inspection.seal_ok && inspection.chain.is_valid {
                Ok(())
            } else {
                Err(GridError::AuditReadFailed {
                    reason: "export failed verification".to_string(),
                })
            }
        }

        Command::SopNew {
            sop_id,
            title,
            version,
            approved_by,
        } => {
            let mut new = NewSopVersion::new(sop_id, title, version);
            if let Some(approver) = approved_by {
                new = new.approved_by(approver);
            }
            let doc = kernel.sops.create_new_version(new)?;
            print_sop(out, &doc)
        }

        Command::SopList => {
            for doc in kernel.sops.list_sops()? {
                print_sop(out, &doc)?;
            }
            Ok(())
        }

        Command::SopActive { sop_id } => match kernel.sops.get_active_sop(&sop_id)? {
            Some(doc) => print_sop(out, &doc),
            None => Err(GridError::NotFound {
                what: format!("active version of {}", sop_id),
            }),
        },

        Command::SopArchive { sop_id } => {
            let count = kernel.sops.archive_all_versions(&sop_id)?;
            emit(out, format_args!("archived {} version(s) of {}\n", count, sop_id))
        }

        Command::RuleId { id } => {
            if is_valid_rule_id_format(&id) {
                emit(out, format_args!("{} is a valid rule id\n", id))
            } else {
                Err(GridError::NotFound {
                    what: format!("rule id format match for '{}'", id),
                })
            }
        }
    }
}

// ── Output helpers ────────────────────────────────────────────────────────────

fn emit(out: &mut dyn Write, args: std::fmt::Arguments<'_>) -> GridResult<()> {
    out.write_fmt(args).map_err(|e| GridError::Serialization {
        reason: format!("failed to write output: {}", e),
    })
}

fn print_entry(out: &mut dyn Write, e: &AuditLogEntry) -> GridResult<()> {
    let result = e
        .result
        .map(|r| format!("{:?}", r).to_uppercase())
        .unwrap_or_else(|| "-".to_string());
    emit(
        out,
        format_args!(
            "{:>5} {} {:<20} {:<7} {:<13} {} {} [{}]\n",
            e.sequence,
            e.timestamp.format("%Y-%m-%d %H:%M:%S"),
            e.action.as_str(),
            result,
            e.rule_id.as_deref().unwrap_or("-"),
            e.object_key.as_deref().unwrap_or("-"),
            e.reason.as_deref().unwrap_or(""),
            ExportSeal::shortened(&e.chain_hash),
        ),
    )
}

fn print_check(out: &mut dyn Write, r: &IntegrityCheckResult) -> GridResult<()> {
    emit(
        out,
        format_args!(
            "{} at {}: {} ({} entries)\n",
            if r.is_valid { "VALID" } else { "INVALID" },
            r.timestamp.format("%Y-%m-%d %H:%M:%S"),
            r.details,
            r.audit_entry_count
        ),
    )
}

fn print_sop(out: &mut dyn Write, d: &SopDocument) -> GridResult<()> {
    emit(
        out,
        format_args!(
            "{} {:<8} {:<8} {} (approved by {})\n",
            d.sop_id,
            d.version,
            format!("{:?}", d.status).to_lowercase(),
            d.title,
            d.approved_by.as_deref().unwrap_or("-"),
        ),
    )
}

fn seal_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".sha256");
    PathBuf::from(name)
}

fn write_file(path: &Path, bytes: &[u8]) -> GridResult<()> {
    write_atomic(path, bytes).map_err(|e| GridError::AuditWriteFailed {
        reason: format!("failed to write '{}': {}", path.display(), e),
    })
}
