//! Per-ticket outcomes and the summary of one dispatch pass

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use shared::{RunId, TicketKey};

use super::filter::SkipReason;

/// Terminal result of processing one ticket in one pass
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum TicketOutcome {
    /// Ticket already had an assignee; the assignment was re-confirmed
    Reassigned { assignee: String, transitioned: bool },
    /// A filter kept the ticket away from automatic routing
    Skipped { reason: SkipReason },
    /// Classified and assigned to the least-loaded team member
    Routed {
        team: String,
        assignee: String,
        open_tickets: u64,
        transitioned: bool,
    },
    /// No team matched; left untouched for a human
    Unroutable,
    /// A backend call failed for this ticket
    Failed { reason: String },
}

impl TicketOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            TicketOutcome::Reassigned { .. } => "reassigned",
            TicketOutcome::Skipped { .. } => "skipped",
            TicketOutcome::Routed { .. } => "routed",
            TicketOutcome::Unroutable => "unroutable",
            TicketOutcome::Failed { .. } => "failed",
        }
    }
}

impl fmt::Display for TicketOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TicketOutcome::Reassigned { assignee, .. } => write!(f, "reassigned to {assignee}"),
            TicketOutcome::Skipped { reason } => write!(f, "skipped: {reason}"),
            TicketOutcome::Routed { team, assignee, .. } => {
                write!(f, "routed to team '{team}', assigned to {assignee}")
            }
            TicketOutcome::Unroutable => write!(f, "no matching team"),
            TicketOutcome::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketReport {
    pub key: TicketKey,
    #[serde(flatten)]
    pub outcome: TicketOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeCounts {
    pub reassigned: usize,
    pub skipped: usize,
    pub routed: usize,
    pub unroutable: usize,
    pub failed: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.reassigned + self.skipped + self.routed + self.unroutable + self.failed
    }
}

impl fmt::Display for OutcomeCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "routed={} reassigned={} skipped={} unroutable={} failed={}",
            self.routed, self.reassigned, self.skipped, self.unroutable, self.failed
        )
    }
}

/// Everything one pass decided, in processing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub reports: Vec<TicketReport>,
}

impl RunSummary {
    pub fn new(run_id: RunId) -> Self {
        Self {
            run_id,
            started_at: Utc::now(),
            finished_at: None,
            reports: Vec::new(),
        }
    }

    pub fn record(&mut self, key: TicketKey, outcome: TicketOutcome) {
        self.reports.push(TicketReport { key, outcome });
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn outcome_for(&self, key: &str) -> Option<&TicketOutcome> {
        self.reports
            .iter()
            .find(|report| report.key.as_str() == key)
            .map(|report| &report.outcome)
    }

    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for report in &self.reports {
            match report.outcome {
                TicketOutcome::Reassigned { .. } => counts.reassigned += 1,
                TicketOutcome::Skipped { .. } => counts.skipped += 1,
                TicketOutcome::Routed { .. } => counts.routed += 1,
                TicketOutcome::Unroutable => counts.unroutable += 1,
                TicketOutcome::Failed { .. } => counts.failed += 1,
            }
        }
        counts
    }
}
