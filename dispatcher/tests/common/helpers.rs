//! Test helpers and builder patterns for dispatcher tests
//!
//! This module provides convenient helper functions and builder patterns
//! to reduce test boilerplate and improve maintainability.
use dispatcher::{
    DispatchConfig, Dispatcher, MockAuditSink, MockLoadProber, MockTicketMutator, MockTicketSource,
    TicketOutcome,
};
use shared::{RunId, Ticket};

use super::fixtures::TestFixtures;

/// Type alias for a dispatcher with all collaborators mocked
pub type TestDispatcher = Dispatcher<MockTicketSource, MockLoadProber, MockTicketMutator, MockAuditSink>;

/// Builder for test dispatchers
///
/// Mocks start without expectations, so any collaborator call a test did not
/// configure fails the test.
pub struct DispatcherBuilder {
    config: DispatchConfig,
    source: MockTicketSource,
    prober: MockLoadProber,
    mutator: MockTicketMutator,
    audit: MockAuditSink,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self {
            config: TestFixtures::config(),
            source: MockTicketSource::new(),
            prober: MockLoadProber::new(),
            mutator: MockTicketMutator::new(),
            audit: MockAuditSink::new(),
        }
    }

    /// Whether an assignment is still sent after a failed transition
    pub fn with_assign_on_transition_failure(mut self, enabled: bool) -> Self {
        self.config.routing.assign_on_transition_failure = enabled;
        self
    }

    /// Serve `tickets` from a single fetch
    pub fn with_tickets(mut self, tickets: Vec<Ticket>) -> Self {
        self.source
            .expect_fetch_pending_tickets()
            .times(1)
            .returning(move || Ok(tickets.clone()));
        self
    }

    /// Configure the ticket source mock with a setup function
    pub fn with_source<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockTicketSource),
    {
        setup(&mut self.source);
        self
    }

    /// Configure the load prober mock with a setup function
    pub fn with_prober<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockLoadProber),
    {
        setup(&mut self.prober);
        self
    }

    /// Configure the mutator mock with a setup function
    pub fn with_mutator<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockTicketMutator),
    {
        setup(&mut self.mutator);
        self
    }

    /// Configure the audit sink mock with a setup function
    pub fn with_audit<F>(mut self, setup: F) -> Self
    where
        F: FnOnce(&mut MockAuditSink),
    {
        setup(&mut self.audit);
        self
    }

    /// Build the dispatcher with all configured mocks
    pub fn build(self) -> TestDispatcher {
        Dispatcher::new(&self.config, self.source, self.prober, self.mutator, self.audit).unwrap()
    }
}

impl Default for DispatcherBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper functions for common test operations
pub struct TestHelpers;

impl TestHelpers {
    /// Open-ticket counts from [`TestFixtures::printer_loads`], each candidate counted once
    pub fn printer_loads(prober: &mut MockLoadProber) {
        prober
            .expect_count_open_tickets()
            .times(TestFixtures::PRINTER_CANDIDATES.len())
            .returning(|login| Ok(TestFixtures::printer_loads(login)));
    }

    /// Every open-ticket count is zero
    pub fn idle_team(prober: &mut MockLoadProber) {
        prober.expect_count_open_tickets().returning(|_| Ok(0));
    }

    /// Transition and assignment both succeed, any number of times
    pub fn accepting_mutator(mutator: &mut MockTicketMutator) {
        mutator.expect_transition_to_in_progress().returning(|_| Ok(()));
        mutator.expect_assign().returning(|_, _| Ok(()));
    }

    /// The mutator must not be called at all
    pub fn untouched_mutator(mutator: &mut MockTicketMutator) {
        mutator.expect_transition_to_in_progress().times(0);
        mutator.expect_assign().times(0);
    }

    /// Audit writes succeed, any number of times
    pub fn accepting_audit(audit: &mut MockAuditSink) {
        audit.expect_record().returning(|_| Ok(()));
    }

    /// Dispatch one ticket outside a full pass
    pub async fn dispatch(dispatcher: &TestDispatcher, ticket: &Ticket) -> TicketOutcome {
        dispatcher.dispatch_ticket(RunId::new(), ticket).await.unwrap()
    }
}
