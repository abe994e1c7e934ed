//! File-backed audit trail of completed dispatches
//!
//! One line per routed or re-confirmed ticket, appended to a size-rotated file
//! separate from the operational log.

use async_trait::async_trait;
use chrono::Local;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use shared::logging::RotatingFileWriter;

use crate::error::{DispatchError, DispatchResult};
use crate::traits::{AuditAction, AuditEntry, AuditSink};

pub struct FileAuditLog {
    path: PathBuf,
    writer: Mutex<RotatingFileWriter>,
}

impl FileAuditLog {
    pub fn open(path: impl Into<PathBuf>, max_bytes: u64, backups: usize) -> DispatchResult<Self> {
        let path = path.into();
        let writer = RotatingFileWriter::open(&path, max_bytes, backups)?;
        Ok(Self {
            path,
            writer: Mutex::new(writer),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Render one audit line: `<local time> - audit - INFO - <message>`
pub fn format_entry(entry: &AuditEntry) -> String {
    let timestamp = entry
        .timestamp
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S%.3f");
    let transition_note = if entry.transitioned {
        ""
    } else {
        " (status transition failed)"
    };

    let message = match &entry.action {
        AuditAction::Reassigned => format!(
            "Ticket {} re-assigned to {}{} [{}]",
            entry.ticket, entry.assignee, transition_note, entry.link
        ),
        AuditAction::Routed { team } => format!(
            "Ticket {} moved to in progress and assigned to {} (team {}){} [{}]",
            entry.ticket, entry.assignee, team, transition_note, entry.link
        ),
    };

    format!("{timestamp} - audit - INFO - run={} {message}", entry.run_id)
}

#[async_trait]
impl AuditSink for FileAuditLog {
    async fn record(&self, entry: &AuditEntry) -> DispatchResult<()> {
        let line = format_entry(entry);
        let mut writer = self.writer.lock().map_err(|_| DispatchError::Audit {
            message: "audit writer lock poisoned".to_string(),
        })?;
        writeln!(writer, "{line}")?;
        writer.flush()?;
        Ok(())
    }
}
