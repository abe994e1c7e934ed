//! Static routing taxonomy: teams, their keywords and their candidate assignees

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{DispatchError, DispatchResult};

/// One team in the routing taxonomy.
///
/// `candidates` is ordered: it is the tie-break order when several members
/// carry the same load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRule {
    pub name: String,
    #[serde(default)]
    pub include: Vec<String>,
    #[serde(default)]
    pub exclude: Vec<String>,
    pub candidates: Vec<String>,
}

impl TeamRule {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            include: Vec::new(),
            exclude: Vec::new(),
            candidates: Vec::new(),
        }
    }

    pub fn include<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include.extend(phrases.into_iter().map(Into::into));
        self
    }

    pub fn exclude<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(phrases.into_iter().map(Into::into));
        self
    }

    pub fn candidates<I, S>(mut self, logins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.candidates.extend(logins.into_iter().map(Into::into));
        self
    }
}

/// Validated, normalised rule table.
///
/// Team order is configuration order and is significant for classification
/// tie-breaks. Phrases are trimmed, lower-cased and de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    teams: Vec<TeamRule>,
}

impl RuleTable {
    pub fn new(teams: Vec<TeamRule>) -> DispatchResult<Self> {
        if teams.is_empty() {
            return Err(DispatchError::config(
                "routing.teams",
                "at least one team must be configured",
            ));
        }

        let mut seen = HashSet::new();
        let mut normalised = Vec::with_capacity(teams.len());

        for team in teams {
            let name = team.name.trim().to_string();
            if name.is_empty() {
                return Err(DispatchError::config("routing.teams.name", "team name is empty"));
            }
            if !seen.insert(name.clone()) {
                return Err(DispatchError::config(
                    "routing.teams.name",
                    format!("duplicate team '{name}'"),
                ));
            }

            let include = normalise_phrases(&team.include);
            if include.is_empty() {
                return Err(DispatchError::config(
                    format!("routing.teams.{name}.include"),
                    "team has no include keywords",
                ));
            }

            let candidates = dedupe(team.candidates.iter().map(|c| c.trim().to_string()));
            if candidates.is_empty() {
                return Err(DispatchError::config(
                    format!("routing.teams.{name}.candidates"),
                    "team has no candidate assignees",
                ));
            }

            normalised.push(TeamRule {
                name,
                include,
                exclude: normalise_phrases(&team.exclude),
                candidates,
            });
        }

        Ok(Self { teams: normalised })
    }

    pub fn teams(&self) -> &[TeamRule] {
        &self.teams
    }

    pub fn team(&self, name: &str) -> Option<&TeamRule> {
        self.teams.iter().find(|team| team.name == name)
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}

/// Lower-case and de-duplicate phrases, preserving first occurrence order.
///
/// Surrounding spaces are part of the phrase (`" ип "` only matches the
/// standalone word); whitespace-only phrases are dropped.
pub fn normalise_phrases(phrases: &[String]) -> Vec<String> {
    dedupe(
        phrases
            .iter()
            .filter(|p| !p.trim().is_empty())
            .map(|p| p.to_lowercase()),
    )
}

fn dedupe(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .filter(|item| !item.is_empty())
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
