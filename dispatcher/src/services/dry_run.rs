//! Dry-run stand-ins: decide everything, change nothing

use async_trait::async_trait;
use tracing::info;

use crate::error::DispatchResult;
use crate::traits::{AuditEntry, AuditSink, TicketMutator};

/// Mutator that only logs what it would have done
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunMutator;

#[async_trait]
impl TicketMutator for DryRunMutator {
    async fn transition_to_in_progress(&self, key: &str) -> DispatchResult<()> {
        info!(ticket = key, "[dry-run] would move ticket to in progress");
        Ok(())
    }

    async fn assign(&self, key: &str, login: &str) -> DispatchResult<()> {
        info!(ticket = key, assignee = login, "[dry-run] would assign ticket");
        Ok(())
    }
}

/// Audit sink that writes to the operational log instead of the audit file
#[derive(Debug, Clone, Copy, Default)]
pub struct LogOnlyAuditSink;

#[async_trait]
impl AuditSink for LogOnlyAuditSink {
    async fn record(&self, entry: &AuditEntry) -> DispatchResult<()> {
        info!(
            ticket = %entry.ticket,
            assignee = %entry.assignee,
            "[dry-run] audit: {}",
            super::audit_log::format_entry(entry)
        );
        Ok(())
    }
}
