//! Ticket dispatcher library
//!
//! Pulls unassigned tickets from the tracker, classifies them against a
//! keyword taxonomy and assigns each one to the least-loaded member of the
//! matching team. Collaborators are injected through the traits in
//! [`traits`], so the decision logic runs unchanged against mocks in tests.

pub mod config;
pub mod core;
pub mod dispatcher;
pub mod error;
pub mod services;
pub mod traits;

// Re-export commonly used types
pub use crate::core::{Classifier, FilterChain, RuleTable, RunSummary, TeamRule, TicketOutcome};
pub use config::DispatchConfig;
pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use traits::{
    AuditAction, AuditEntry, AuditSink, LoadProber, PacingPolicy, TicketMutator, TicketSource,
};
pub use traits::{
    MockAuditSink, MockLoadProber, MockPacingPolicy, MockTicketMutator, MockTicketSource,
};
