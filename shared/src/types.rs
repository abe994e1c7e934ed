//! Core ticket types and identifiers

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

/// Issue key as reported by the tracker (e.g. `SD911-1042`)
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketKey(String);

impl TicketKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TicketKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TicketKey {
    fn from(key: &str) -> Self {
        Self(key.to_string())
    }
}

/// Identifier of a single dispatch pass, attached to log lines and audit entries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Snapshot of a pending ticket, read once per dispatch pass.
///
/// The tracker stays the system of record: nothing here is mutated locally,
/// every state change goes through the mutation collaborator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    pub key: TicketKey,
    pub subject: String,
    /// Missing or null descriptions are normalised to an empty string
    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignee: Option<String>,
}

impl Ticket {
    pub fn new(key: impl Into<TicketKey>, subject: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            subject: subject.into(),
            description: String::new(),
            assignee: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_assignee(mut self, assignee: impl Into<String>) -> Self {
        self.assignee = Some(assignee.into());
        self
    }

    /// Lower-cased subject and description joined for keyword matching.
    ///
    /// The newline keeps a phrase from matching across the subject/description seam.
    pub fn searchable_text(&self) -> String {
        format!(
            "{}\n{}",
            self.subject.to_lowercase(),
            self.description.to_lowercase()
        )
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl From<String> for TicketKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}
