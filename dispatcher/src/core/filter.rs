//! Filter chain applied to unassigned tickets before classification
//!
//! Two filters run in a fixed order: the asset-tag exclusion on the
//! description, then the ignored-subject-prefix check. The first one that
//! matches decides; later filters assume earlier ones passed.

use serde::{Deserialize, Serialize};
use std::fmt;

use shared::Ticket;

use super::rules::normalise_phrases;

/// Allow-within-deny rule on the ticket description.
///
/// A description containing `marker` is skipped unless it also contains at
/// least one of the narrower `allowed` markers. An empty marker disables the
/// rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetTagRule {
    #[serde(default)]
    pub marker: String,
    #[serde(default)]
    pub allowed: Vec<String>,
}

impl AssetTagRule {
    pub fn new(marker: impl Into<String>, allowed: Vec<String>) -> Self {
        Self {
            marker: marker.into(),
            allowed,
        }
    }

    pub fn disabled() -> Self {
        Self::new("", Vec::new())
    }

    fn normalised(&self) -> Self {
        Self {
            marker: if self.marker.trim().is_empty() {
                String::new()
            } else {
                self.marker.to_lowercase()
            },
            allowed: normalise_phrases(&self.allowed),
        }
    }
}

impl Default for AssetTagRule {
    fn default() -> Self {
        Self::new(
            "nb-z",
            vec!["nb-z04".to_string(), "nb-z4-".to_string(), "nb-24-".to_string()],
        )
    }
}

/// Why a ticket was kept away from automatic routing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "filter", rename_all = "snake_case")]
pub enum SkipReason {
    /// Description carries the reserved marker but none of the allowed ones
    AssetTag { marker: String },
    /// Subject starts with an ignored prefix
    IgnoredPrefix { prefix: String },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::AssetTag { marker } => {
                write!(f, "description contains reserved marker '{marker}' without an allowed sub-marker")
            }
            SkipReason::IgnoredPrefix { prefix } => {
                write!(f, "subject starts with ignored prefix '{prefix}'")
            }
        }
    }
}

/// Result of running a ticket through the chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterVerdict {
    Continue,
    Skip(SkipReason),
}

/// Ordered, read-only filter chain
#[derive(Debug, Clone)]
pub struct FilterChain {
    asset_tag: AssetTagRule,
    ignored_prefixes: Vec<String>,
}

impl FilterChain {
    pub fn new(asset_tag: &AssetTagRule, ignored_prefixes: &[String]) -> Self {
        Self {
            asset_tag: asset_tag.normalised(),
            ignored_prefixes: normalise_phrases(ignored_prefixes),
        }
    }

    pub fn evaluate(&self, ticket: &Ticket) -> FilterVerdict {
        if let Some(reason) = self.check_asset_tag(ticket) {
            return FilterVerdict::Skip(reason);
        }
        if let Some(reason) = self.check_ignored_prefix(ticket) {
            return FilterVerdict::Skip(reason);
        }
        FilterVerdict::Continue
    }

    fn check_asset_tag(&self, ticket: &Ticket) -> Option<SkipReason> {
        let rule = &self.asset_tag;
        if rule.marker.is_empty() {
            return None;
        }

        let description = ticket.description.to_lowercase();
        if !description.contains(&rule.marker) {
            return None;
        }
        if rule.allowed.iter().any(|allowed| description.contains(allowed)) {
            return None;
        }

        Some(SkipReason::AssetTag {
            marker: rule.marker.clone(),
        })
    }

    fn check_ignored_prefix(&self, ticket: &Ticket) -> Option<SkipReason> {
        let subject = ticket.subject.to_lowercase();
        self.ignored_prefixes
            .iter()
            .find(|prefix| subject.starts_with(prefix.as_str()))
            .map(|prefix| SkipReason::IgnoredPrefix {
                prefix: prefix.clone(),
            })
    }
}
