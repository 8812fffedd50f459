//! JSON-lines file implementation of `AuditTrail`.
//!
//! One `AuditLogEntry` per line, appended in chain order. Opening an existing
//! file reloads every entry and resumes the chain from the last stored hash;
//! verification is left to the integrity verifier so a tampered file can
//! still be opened and inspected.
//!
//! `fetch_all_entries` always re-reads the file, so a verifier running
//! against an open trail sees what is actually on disk.

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard},
};

use tracing::{debug, error, info, warn};

use grid_contracts::{
    audit::{AuditDraft, AuditLogEntry},
    error::{GridError, GridResult},
};
use grid_core::traits::AuditTrail;

use crate::chain::ChainState;

struct JsonlState {
    chain: ChainState,
    file: File,
    /// Set when a failed write could not be rolled back; no further appends.
    torn: bool,
}

/// An append target that can be cut back to an earlier length.
trait LineSink: Write {
    fn size(&mut self) -> io::Result<u64>;
    fn truncate(&mut self, len: u64) -> io::Result<()>;
    fn sync(&mut self) -> io::Result<()>;
}

impl LineSink for File {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }

    fn truncate(&mut self, len: u64) -> io::Result<()> {
        self.set_len(len)?;
        self.sync_data()
    }

    fn sync(&mut self) -> io::Result<()> {
        self.sync_data()
    }
}

/// Why a line could not be appended.
enum AppendError {
    /// The sink is back at its previous length.
    RolledBack(io::Error),
    /// Partial bytes may remain after the previous last line.
    Torn(io::Error),
}

/// Write `line` and sync it, or restore the sink to its previous length.
fn append_line(sink: &mut impl LineSink, line: &[u8]) -> Result<(), AppendError> {
    let prev_len = sink.size().map_err(AppendError::RolledBack)?;
    let written = sink.write_all(line).and_then(|()| sink.sync());
    match written {
        Ok(()) => Ok(()),
        Err(e) => match sink.truncate(prev_len) {
            Ok(()) => Err(AppendError::RolledBack(e)),
            Err(rollback) => {
                error!(error = %rollback, "failed to roll back partial audit line");
                Err(AppendError::Torn(e))
            }
        },
    }
}

/// A file-backed, append-only audit trail.
///
/// Every successful `append` has been written and synced to disk before it
/// returns. A failed write is truncated away and leaves the chain head
/// unchanged. If the truncation itself fails the trail refuses further
/// appends until it is reopened.
pub struct JsonlAuditTrail {
    path: PathBuf,
    state: Mutex<JsonlState>,
}

impl JsonlAuditTrail {
    /// Open (or create) the trail at `path`.
    ///
    /// Returns `GridError::AuditReadFailed` if the file exists but cannot be
    /// read or contains a line that is not a valid entry.
    pub fn open(path: impl AsRef<Path>) -> GridResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| GridError::AuditReadFailed {
                    reason: format!("failed to create '{}': {}", parent.display(), e),
                })?;
            }
        }

        let entries = Self::load(&path)?;
        debug!(path = %path.display(), entries = entries.len(), "audit trail loaded");

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| GridError::AuditWriteFailed {
                reason: format!("failed to open '{}' for append: {}", path.display(), e),
            })?;

        Ok(Self {
            path,
            state: Mutex::new(JsonlState {
                chain: ChainState::from_entries(entries),
                file,
                torn: false,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(path: &Path) -> GridResult<Vec<AuditLogEntry>> {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(GridError::AuditReadFailed {
                    reason: format!("failed to open '{}': {}", path.display(), e),
                })
            }
        };

        let mut entries = Vec::new();
        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| GridError::AuditReadFailed {
                reason: format!("failed to read '{}': {}", path.display(), e),
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let entry: AuditLogEntry =
                serde_json::from_str(&line).map_err(|e| GridError::AuditReadFailed {
                    reason: format!("{}:{}: malformed entry: {}", path.display(), idx + 1, e),
                })?;
            entries.push(entry);
        }
        Ok(entries)
    }

    fn lock(&self) -> GridResult<MutexGuard<'_, JsonlState>> {
        self.state.lock().map_err(|e| GridError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })
    }
}

impl AuditTrail for JsonlAuditTrail {
    fn append(&self, draft: AuditDraft) -> GridResult<AuditLogEntry> {
        let mut state = self.lock()?;
        if state.torn {
            return Err(GridError::AuditWriteFailed {
                reason: format!(
                    "'{}' holds a partial line from an earlier failed append",
                    self.path.display()
                ),
            });
        }
        let entry = state.chain.next(draft)?;

        let mut line = serde_json::to_vec(&entry)?;
        line.push(b'\n');

        if let Err(failure) = append_line(&mut state.file, &line) {
            let e = match failure {
                AppendError::RolledBack(e) => e,
                AppendError::Torn(e) => {
                    state.torn = true;
                    e
                }
            };
            return Err(GridError::AuditWriteFailed {
                reason: format!("failed to append to '{}': {}", self.path.display(), e),
            });
        }

        info!(
            sequence = entry.sequence,
            action = %entry.action,
            chain_hash = %entry.chain_hash,
            "audit entry appended"
        );

        state.chain.commit(entry.clone());
        Ok(entry)
    }

    fn fetch_all_entries(&self) -> GridResult<Vec<AuditLogEntry>> {
        let state = self.lock()?;
        let entries = Self::load(&self.path)?;
        if entries.len() != state.chain.entries.len() {
            warn!(
                path = %self.path.display(),
                on_disk = entries.len(),
                appended = state.chain.entries.len(),
                "audit file entry count differs from appended entries"
            );
        }
        Ok(entries)
    }

    fn entry_count(&self) -> GridResult<usize> {
        Ok(self.lock()?.chain.entries.len())
    }

    fn last_hash(&self) -> GridResult<String> {
        Ok(self.lock()?.chain.last_hash.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Accepts `budget` bytes, then fails every write.
    struct ShortSink {
        buf: Vec<u8>,
        budget: usize,
        truncate_fails: bool,
    }

    impl ShortSink {
        fn new(existing: &[u8], budget: usize) -> Self {
            Self {
                buf: existing.to_vec(),
                budget,
                truncate_fails: false,
            }
        }
    }

    impl Write for ShortSink {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            if self.budget == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "no space left"));
            }
            let n = bytes.len().min(self.budget);
            self.buf.extend_from_slice(&bytes[..n]);
            self.budget -= n;
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl LineSink for ShortSink {
        fn size(&mut self) -> io::Result<u64> {
            Ok(self.buf.len() as u64)
        }

        fn truncate(&mut self, len: u64) -> io::Result<()> {
            if self.truncate_fails {
                return Err(io::Error::new(io::ErrorKind::Other, "read-only"));
            }
            self.buf.truncate(len as usize);
            Ok(())
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn partial_write_is_rolled_back() {
        let mut sink = ShortSink::new(b"{\"a\":1}\n", 5);
        let result = append_line(&mut sink, b"{\"b\":2}\n");
        assert!(matches!(result, Err(AppendError::RolledBack(_))));
        assert_eq!(sink.buf, b"{\"a\":1}\n");
    }

    #[test]
    fn failed_rollback_is_reported_as_torn() {
        let mut sink = ShortSink::new(b"", 3);
        sink.truncate_fails = true;
        assert!(matches!(
            append_line(&mut sink, b"{\"b\":2}\n"),
            Err(AppendError::Torn(_))
        ));
    }

    #[test]
    fn complete_write_is_kept() {
        let mut sink = ShortSink::new(b"", 64);
        assert!(append_line(&mut sink, b"{\"b\":2}\n").is_ok());
        assert_eq!(sink.buf, b"{\"b\":2}\n");
    }

    #[test]
    fn torn_trail_refuses_appends() {
        let dir = tempfile::tempdir().unwrap();
        let trail = JsonlAuditTrail::open(dir.path().join("audit.jsonl")).unwrap();
        trail.lock().unwrap().torn = true;

        let draft = AuditDraft::system(grid_contracts::audit::AuditAction::IntegrityCheck);
        assert!(matches!(
            trail.append(draft),
            Err(GridError::AuditWriteFailed { .. })
        ));
        assert_eq!(trail.entry_count().unwrap(), 0);
    }
}
