//! Keyword classifier: picks at most one team for a ticket's text
//!
//! Scoring policy: a team is eligible when at least one include phrase and no
//! exclude phrase occurs in the text. The eligible team with the strictly
//! highest include count wins; on a tie the team configured first wins.
//! Matching is plain substring containment on lower-cased text.

use shared::Ticket;

use super::rules::{RuleTable, TeamRule};

/// Match counts for one team against one text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamScore<'a> {
    pub team: &'a TeamRule,
    pub include_matches: usize,
    pub exclude_matches: usize,
}

impl TeamScore<'_> {
    pub fn is_eligible(&self) -> bool {
        self.include_matches > 0 && self.exclude_matches == 0
    }
}

/// Pure classifier over an immutable rule table
#[derive(Debug, Clone)]
pub struct Classifier {
    rules: RuleTable,
}

impl Classifier {
    pub fn new(rules: RuleTable) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Score every team in configuration order. `text` must already be lower-cased.
    pub fn scores<'a>(&'a self, text: &str) -> Vec<TeamScore<'a>> {
        self.rules
            .teams()
            .iter()
            .map(|team| TeamScore {
                team,
                include_matches: count_matches(&team.include, text),
                exclude_matches: count_matches(&team.exclude, text),
            })
            .collect()
    }

    /// Select the best team for lower-cased `text`, if any is eligible
    pub fn classify(&self, text: &str) -> Option<&TeamRule> {
        let mut best: Option<TeamScore<'_>> = None;

        for score in self.scores(text) {
            if !score.is_eligible() {
                continue;
            }
            // strict comparison: an equal score never displaces an earlier team
            if best.map_or(true, |b| score.include_matches > b.include_matches) {
                best = Some(score);
            }
        }

        best.map(|score| score.team)
    }

    pub fn classify_ticket(&self, ticket: &Ticket) -> Option<&TeamRule> {
        self.classify(&ticket.searchable_text())
    }
}

fn count_matches(phrases: &[String], text: &str) -> usize {
    phrases.iter().filter(|phrase| text.contains(phrase.as_str())).count()
}
