//! Service implementations
//!
//! Real implementations of the collaborator traits. These handle the actual
//! I/O: HTTP calls to the tracker, the audit file and call pacing.

pub mod audit_log;
pub mod dry_run;
pub mod jira;
pub mod pacing;

#[cfg(test)]
mod tests;

pub use audit_log::FileAuditLog;
pub use dry_run::{DryRunMutator, LogOnlyAuditSink};
pub use jira::{browse_url, JiraClient};
pub use pacing::{pacing_from_millis, MinIntervalGate, NoPacing};
