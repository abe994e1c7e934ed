//! Main dispatcher implementation
//!
//! Drives one pass over the pending tickets: filter, classify, pick the
//! least-loaded candidate, transition and assign. Tickets are processed one
//! at a time in the order the search returned them; each ticket ends in
//! exactly one [`TicketOutcome`] and nothing is retried.

use std::time::Duration;
use tokio::sync::mpsc::{self, error::TryRecvError};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};
use url::Url;

use shared::{logging, RunId, Ticket, TicketKey};

use crate::config::DispatchConfig;
use crate::core::{
    least_loaded, CandidateLoad, Classifier, FilterChain, FilterVerdict, RunSummary, TeamRule,
    TicketOutcome,
};
use crate::error::{DispatchError, DispatchResult};
use crate::services::browse_url;
use crate::traits::{AuditAction, AuditEntry, AuditSink, LoadProber, TicketMutator, TicketSource};

/// Dispatcher over injected collaborators
pub struct Dispatcher<S, L, M, A>
where
    S: TicketSource,
    L: LoadProber,
    M: TicketMutator,
    A: AuditSink,
{
    filters: FilterChain,
    classifier: Classifier,
    base_url: Url,
    assign_on_transition_failure: bool,

    source: S,
    prober: L,
    mutator: M,
    audit: A,
}

impl<S, L, M, A> Dispatcher<S, L, M, A>
where
    S: TicketSource,
    L: LoadProber,
    M: TicketMutator,
    A: AuditSink,
{
    /// Create a dispatcher from configuration and injected services
    pub fn new(config: &DispatchConfig, source: S, prober: L, mutator: M, audit: A) -> DispatchResult<Self> {
        let rules = config.rule_table()?;
        let filters = FilterChain::new(&config.routing.asset_tag, &config.routing.ignored_prefixes);

        Ok(Self {
            filters,
            classifier: Classifier::new(rules),
            base_url: config.base_url()?,
            assign_on_transition_failure: config.routing.assign_on_transition_failure,
            source,
            prober,
            mutator,
            audit,
        })
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Run one full pass.
    ///
    /// Only a failed fetch is returned as an error; per-ticket failures end up
    /// as [`TicketOutcome::Failed`] in the summary.
    pub async fn run_once(&self) -> DispatchResult<RunSummary> {
        let (summary, _) = self.run_pass(None).await?;
        Ok(summary)
    }

    /// Repeat [`run_once`](Self::run_once) every `period` until a shutdown signal arrives.
    ///
    /// The signal is also checked between tickets, so a pass in progress stops
    /// before its next ticket; a ticket already being dispatched is finished.
    /// A failed fetch only ends that pass. Returns the number of passes started.
    pub async fn run_every(&self, period: Duration, mut shutdown_rx: mpsc::Receiver<()>) -> usize {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut passes = 0;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    passes += 1;
                    match self.run_pass(Some(&mut shutdown_rx)).await {
                        Ok((_, true)) => {
                            logging::log_shutdown("shutdown requested during dispatch pass");
                            break;
                        }
                        Ok(_) => {}
                        Err(e) => logging::log_error("Dispatch pass", &e),
                    }
                }
                _ = shutdown_rx.recv() => {
                    logging::log_shutdown("shutdown requested");
                    break;
                }
            }
        }

        passes
    }

    /// One pass over the pending tickets; the flag reports an early stop on shutdown
    async fn run_pass(&self, mut shutdown_rx: Option<&mut mpsc::Receiver<()>>) -> DispatchResult<(RunSummary, bool)> {
        let run_id = RunId::new();
        let mut summary = RunSummary::new(run_id);
        let mut interrupted = false;

        let tickets = self.source.fetch_pending_tickets().await?;
        info!(run = %run_id, "📋 Dispatch pass started with {} pending tickets", tickets.len());

        for ticket in &tickets {
            if let Some(rx) = shutdown_rx.as_mut() {
                // A closed channel counts as a shutdown request, as in run_every
                if !matches!(rx.try_recv(), Err(TryRecvError::Empty)) {
                    warn!(run = %run_id, remaining = tickets.len() - summary.reports.len(), "Pass interrupted by shutdown");
                    interrupted = true;
                    break;
                }
            }

            let outcome = match self.dispatch_ticket(run_id, ticket).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(run = %run_id, ticket = %ticket.key, error = %e, "❌ Ticket dispatch failed");
                    TicketOutcome::Failed {
                        reason: e.to_string(),
                    }
                }
            };
            summary.record(ticket.key.clone(), outcome);
        }

        summary.finish();
        info!(run = %run_id, "📊 Dispatch pass finished: {}", summary.counts());
        Ok((summary, interrupted))
    }

    /// Decide and apply the outcome for a single ticket
    pub async fn dispatch_ticket(&self, run_id: RunId, ticket: &Ticket) -> DispatchResult<TicketOutcome> {
        if let Some(assignee) = ticket.assignee.as_deref() {
            return self.reconfirm(run_id, ticket, assignee).await;
        }

        if let FilterVerdict::Skip(reason) = self.filters.evaluate(ticket) {
            info!(ticket = %ticket.key, "Ticket skipped: {}", reason);
            return Ok(TicketOutcome::Skipped { reason });
        }

        let text = ticket.searchable_text();
        for score in self.classifier.scores(&text) {
            debug!(
                ticket = %ticket.key,
                team = %score.team.name,
                include = score.include_matches,
                exclude = score.exclude_matches,
                "Team score"
            );
        }

        let Some(team) = self.classifier.classify(&text) else {
            warn!(
                ticket = %ticket.key,
                "Could not determine a team. Subject: {}, Description: {}",
                ticket.subject,
                ticket.description
            );
            return Ok(TicketOutcome::Unroutable);
        };

        self.route(run_id, ticket, team).await
    }

    async fn reconfirm(&self, run_id: RunId, ticket: &Ticket, assignee: &str) -> DispatchResult<TicketOutcome> {
        let transitioned = self.transition(&ticket.key).await?;
        self.mutator.assign(ticket.key.as_str(), assignee).await?;

        info!(ticket = %ticket.key, assignee, "Ticket re-assigned to existing assignee");
        self.write_audit(run_id, &ticket.key, AuditAction::Reassigned, assignee, transitioned)
            .await;

        Ok(TicketOutcome::Reassigned {
            assignee: assignee.to_string(),
            transitioned,
        })
    }

    async fn route(&self, run_id: RunId, ticket: &Ticket, team: &TeamRule) -> DispatchResult<TicketOutcome> {
        let chosen = self.pick_assignee(team).await?;

        let transitioned = self.transition(&ticket.key).await?;
        self.mutator.assign(ticket.key.as_str(), &chosen.login).await?;

        info!(
            ticket = %ticket.key,
            team = %team.name,
            assignee = %chosen.login,
            open_tickets = chosen.open_tickets,
            "Ticket routed"
        );
        let action = AuditAction::Routed {
            team: team.name.clone(),
        };
        self.write_audit(run_id, &ticket.key, action, &chosen.login, transitioned)
            .await;

        Ok(TicketOutcome::Routed {
            team: team.name.clone(),
            assignee: chosen.login,
            open_tickets: chosen.open_tickets,
            transitioned,
        })
    }

    /// Probe every candidate in configured order and take the least loaded
    async fn pick_assignee(&self, team: &TeamRule) -> DispatchResult<CandidateLoad> {
        let mut loads = Vec::with_capacity(team.candidates.len());
        for login in &team.candidates {
            let open_tickets = self.prober.count_open_tickets(login).await?;
            loads.push(CandidateLoad::new(login.clone(), open_tickets));
        }

        least_loaded(&loads).cloned().ok_or_else(|| {
            DispatchError::config(
                format!("routing.teams.{}.candidates", team.name),
                "team has no candidate assignees",
            )
        })
    }

    /// Returns whether the transition succeeded; a failure is only fatal for
    /// the ticket when assigning after a failed transition is disabled.
    async fn transition(&self, key: &TicketKey) -> DispatchResult<bool> {
        match self.mutator.transition_to_in_progress(key.as_str()).await {
            Ok(()) => Ok(true),
            Err(e) if self.assign_on_transition_failure => {
                error!(ticket = %key, error = %e, "Failed to move ticket to in progress; assigning anyway");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn write_audit(
        &self,
        run_id: RunId,
        key: &TicketKey,
        action: AuditAction,
        assignee: &str,
        transitioned: bool,
    ) {
        let entry = AuditEntry {
            timestamp: chrono::Utc::now(),
            run_id,
            ticket: key.clone(),
            action,
            assignee: assignee.to_string(),
            transitioned,
            link: browse_url(&self.base_url, key.as_str()),
        };

        // The assignment is already committed; a lost audit line must not fail the ticket.
        if let Err(e) = self.audit.record(&entry).await {
            error!(ticket = %key, error = %e, "Failed to write audit entry");
        }
    }
}
