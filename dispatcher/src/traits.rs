//! Trait definitions with mockall annotations for testing
//!
//! Every collaborator the dispatcher talks to sits behind one of these traits:
//! the ticket search, the load probe, the mutation calls, the audit trail and
//! the pacing policy. Real implementations live in `services`; tests use the
//! generated `Mock*` types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::{RunId, Ticket, TicketKey};
use std::sync::Arc;

use crate::error::DispatchResult;

/// What a successful dispatch did, as written to the audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum AuditAction {
    /// Existing assignee re-confirmed
    Reassigned,
    /// Classified into `team` and assigned
    Routed { team: String },
}

/// One line of the success-only audit trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub run_id: RunId,
    pub ticket: TicketKey,
    #[serde(flatten)]
    pub action: AuditAction,
    pub assignee: String,
    pub transitioned: bool,
    /// Human-followable link to the ticket
    pub link: String,
}

/// Source of pending tickets
///
/// A failure here is fatal for the whole pass.
#[mockall::automock]
#[async_trait::async_trait]
pub trait TicketSource: Send + Sync {
    /// Return every ticket matching the configured pending-ticket query
    async fn fetch_pending_tickets(&self) -> DispatchResult<Vec<Ticket>>;
}

/// Load signal used for balancing
#[mockall::automock]
#[async_trait::async_trait]
pub trait LoadProber: Send + Sync {
    /// Number of tickets currently assigned to `login` in one of the open statuses
    async fn count_open_tickets(&self, login: &str) -> DispatchResult<u64>;
}

/// Mutating calls against the tracker
#[mockall::automock]
#[async_trait::async_trait]
pub trait TicketMutator: Send + Sync {
    /// Move the ticket into the "in progress" state
    async fn transition_to_in_progress(&self, key: &str) -> DispatchResult<()>;

    /// Set the ticket's assignee
    async fn assign(&self, key: &str, login: &str) -> DispatchResult<()>;
}

/// Success-only audit trail
#[mockall::automock]
#[async_trait::async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, entry: &AuditEntry) -> DispatchResult<()>;
}

/// Spacing policy applied before each mutating backend call
#[mockall::automock]
#[async_trait::async_trait]
pub trait PacingPolicy: Send + Sync {
    /// Wait until the next call is allowed
    async fn pace(&self);
}

// One backend client usually serves as source, prober and mutator at once.

#[async_trait::async_trait]
impl<T: TicketSource + ?Sized> TicketSource for Arc<T> {
    async fn fetch_pending_tickets(&self) -> DispatchResult<Vec<Ticket>> {
        self.as_ref().fetch_pending_tickets().await
    }
}

#[async_trait::async_trait]
impl<T: LoadProber + ?Sized> LoadProber for Arc<T> {
    async fn count_open_tickets(&self, login: &str) -> DispatchResult<u64> {
        self.as_ref().count_open_tickets(login).await
    }
}

#[async_trait::async_trait]
impl<T: TicketMutator + ?Sized> TicketMutator for Arc<T> {
    async fn transition_to_in_progress(&self, key: &str) -> DispatchResult<()> {
        self.as_ref().transition_to_in_progress(key).await
    }

    async fn assign(&self, key: &str, login: &str) -> DispatchResult<()> {
        self.as_ref().assign(key, login).await
    }
}
