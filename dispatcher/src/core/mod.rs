//! Core dispatch logic
//!
//! Pure decision making with no I/O: rule table validation, the filter chain,
//! the keyword classifier, least-loaded selection and outcome bookkeeping.
//! Everything here is deterministic and testable without a backend.

pub mod balancer;
pub mod classifier;
pub mod filter;
pub mod outcome;
pub mod rules;

pub use balancer::{least_loaded, CandidateLoad};
pub use classifier::{Classifier, TeamScore};
pub use filter::{AssetTagRule, FilterChain, FilterVerdict, SkipReason};
pub use outcome::{OutcomeCounts, RunSummary, TicketOutcome, TicketReport};
pub use rules::{RuleTable, TeamRule};
