//! Least-loaded candidate selection

use serde::{Deserialize, Serialize};

/// Open-ticket count observed for one candidate at probe time
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateLoad {
    pub login: String,
    pub open_tickets: u64,
}

impl CandidateLoad {
    pub fn new(login: impl Into<String>, open_tickets: u64) -> Self {
        Self {
            login: login.into(),
            open_tickets,
        }
    }
}

/// Pick the candidate with the fewest open tickets.
///
/// Loads must be given in configured candidate order; among equal minimums
/// the earliest candidate wins. Returns `None` only for an empty slice.
pub fn least_loaded(loads: &[CandidateLoad]) -> Option<&CandidateLoad> {
    let mut best: Option<&CandidateLoad> = None;
    for load in loads {
        match best {
            Some(current) if load.open_tickets >= current.open_tickets => {}
            _ => best = Some(load),
        }
    }
    best
}
