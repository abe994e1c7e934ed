//! Unit tests for single-ticket dispatch decisions
//!
//! Each test drives one ticket through the dispatcher with strict mocks, so
//! any backend call the decision should not make fails the test.

use mockall::Sequence;

use dispatcher::core::SkipReason;
use dispatcher::{AuditAction, DispatchError, TicketOutcome};
use shared::Ticket;

mod common;
use common::{DispatcherBuilder, TestFixtures, TestHelpers};

/// An already-assigned ticket is re-confirmed without classification or probing
#[tokio::test]
async fn test_assigned_ticket_is_reconfirmed_without_probing() {
    // Arrange
    let mut seq = Sequence::new();
    let dispatcher = DispatcherBuilder::new()
        .with_prober(|prober| {
            prober.expect_count_open_tickets().times(0);
        })
        .with_mutator(|mutator| {
            mutator
                .expect_transition_to_in_progress()
                .withf(|key| key == "SD-1")
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_| Ok(()));
            mutator
                .expect_assign()
                .withf(|key, login| key == "SD-1" && login == "zoe")
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        })
        .with_audit(|audit| {
            audit
                .expect_record()
                .withf(|entry| entry.action == AuditAction::Reassigned && entry.assignee == "zoe")
                .times(1)
                .returning(|_| Ok(()));
        })
        .build();

    // Act
    let outcome = TestHelpers::dispatch(&dispatcher, &TestFixtures::assigned_ticket("SD-1", "zoe")).await;

    // Assert
    assert_eq!(
        outcome,
        TicketOutcome::Reassigned {
            assignee: "zoe".to_string(),
            transitioned: true,
        }
    );
}

/// A subject with an ignored prefix is skipped with zero mutations
#[tokio::test]
async fn test_laptop_handout_is_skipped() {
    // Arrange
    let dispatcher = DispatcherBuilder::new()
        .with_prober(|prober| {
            prober.expect_count_open_tickets().times(0);
        })
        .with_mutator(TestHelpers::untouched_mutator)
        .build();

    // Act
    let outcome = TestHelpers::dispatch(&dispatcher, &TestFixtures::laptop_handout_ticket("SD-2")).await;

    // Assert - the description would classify into "workplace" otherwise
    assert_eq!(
        outcome,
        TicketOutcome::Skipped {
            reason: SkipReason::IgnoredPrefix {
                prefix: "выдача ноутбука -".to_string(),
            },
        }
    );
}

/// The reserved asset-tag marker without an allowed sub-marker skips the ticket
#[tokio::test]
async fn test_asset_tag_without_allowed_marker_is_skipped() {
    let dispatcher = DispatcherBuilder::new()
        .with_mutator(TestHelpers::untouched_mutator)
        .build();
    let ticket = Ticket::new("SD-3", "Не печатает принтер").with_description("Инв. номер NB-Z123");

    let outcome = TestHelpers::dispatch(&dispatcher, &ticket).await;

    assert_eq!(
        outcome,
        TicketOutcome::Skipped {
            reason: SkipReason::AssetTag {
                marker: "nb-z".to_string(),
            },
        }
    );
}

/// An allowed sub-marker lets the ticket through to classification
#[tokio::test]
async fn test_asset_tag_with_allowed_marker_is_routed() {
    let dispatcher = DispatcherBuilder::new()
        .with_prober(TestHelpers::idle_team)
        .with_mutator(TestHelpers::accepting_mutator)
        .with_audit(TestHelpers::accepting_audit)
        .build();
    let ticket = Ticket::new("SD-4", "Не печатает принтер").with_description("Инв. номер nb-z04-0042");

    let outcome = TestHelpers::dispatch(&dispatcher, &ticket).await;

    assert!(matches!(outcome, TicketOutcome::Routed { ref team, .. } if team == "printers"));
}

/// Loads {5, 2, 2} pick the second candidate: lowest load, first in order
#[tokio::test]
async fn test_least_loaded_candidate_wins_with_order_tie_break() {
    // Arrange
    let dispatcher = DispatcherBuilder::new()
        .with_prober(TestHelpers::printer_loads)
        .with_mutator(|mutator| {
            mutator
                .expect_transition_to_in_progress()
                .withf(|key| key == "SD-5")
                .times(1)
                .returning(|_| Ok(()));
            mutator
                .expect_assign()
                .withf(|key, login| key == "SD-5" && login == "bob")
                .times(1)
                .returning(|_, _| Ok(()));
        })
        .with_audit(|audit| {
            audit
                .expect_record()
                .withf(|entry| {
                    entry.action
                        == AuditAction::Routed {
                            team: "printers".to_string(),
                        }
                        && entry.assignee == "bob"
                        && entry.transitioned
                        && entry.link == "https://jira.test/browse/SD-5"
                })
                .times(1)
                .returning(|_| Ok(()));
        })
        .build();

    // Act
    let outcome = TestHelpers::dispatch(&dispatcher, &TestFixtures::printer_ticket("SD-5")).await;

    // Assert
    assert_eq!(
        outcome,
        TicketOutcome::Routed {
            team: "printers".to_string(),
            assignee: "bob".to_string(),
            open_tickets: 2,
            transitioned: true,
        }
    );
}

/// A ticket matching no team is left untouched
#[tokio::test]
async fn test_unmatched_ticket_is_unroutable() {
    let dispatcher = DispatcherBuilder::new()
        .with_prober(|prober| {
            prober.expect_count_open_tickets().times(0);
        })
        .with_mutator(TestHelpers::untouched_mutator)
        .build();

    let outcome = TestHelpers::dispatch(&dispatcher, &TestFixtures::unroutable_ticket("SD-6")).await;

    assert_eq!(outcome, TicketOutcome::Unroutable);
}

/// An exclusion match makes the team ineligible even with include matches
#[tokio::test]
async fn test_exclusion_dominates_inclusion() {
    let dispatcher = DispatcherBuilder::new()
        .with_mutator(TestHelpers::untouched_mutator)
        .build();
    let ticket = Ticket::new("SD-7", "3D-принтер не греет стол").with_description("принтер на складе");

    let outcome = TestHelpers::dispatch(&dispatcher, &ticket).await;

    assert_eq!(outcome, TicketOutcome::Unroutable);
}

/// Equal scores go to the team configured first
#[tokio::test]
async fn test_equal_scores_prefer_first_team() {
    let dispatcher = DispatcherBuilder::new().build();

    let team = dispatcher
        .classifier()
        .classify("принтер не видит сеть")
        .map(|team| team.name.as_str());

    assert_eq!(team, Some("printers"));
}

/// The team with the most include matches wins
#[tokio::test]
async fn test_highest_score_wins() {
    let dispatcher = DispatcherBuilder::new()
        .with_prober(TestHelpers::idle_team)
        .with_mutator(TestHelpers::accepting_mutator)
        .with_audit(TestHelpers::accepting_audit)
        .build();
    let ticket = Ticket::new("SD-8", "Не работает VPN и wi-fi").with_description("принтер тоже");

    let outcome = TestHelpers::dispatch(&dispatcher, &ticket).await;

    assert_eq!(
        outcome,
        TicketOutcome::Routed {
            team: "network".to_string(),
            assignee: TestFixtures::NETWORK_CANDIDATES[0].to_string(),
            open_tickets: 0,
            transitioned: true,
        }
    );
}

/// By default a failed transition still leads to an assignment
#[tokio::test]
async fn test_transition_failure_still_assigns_by_default() {
    let dispatcher = DispatcherBuilder::new()
        .with_prober(TestHelpers::printer_loads)
        .with_mutator(|mutator| {
            mutator
                .expect_transition_to_in_progress()
                .times(1)
                .returning(|_| Err(DispatchError::backend("transition", "HTTP 400 Bad Request")));
            mutator
                .expect_assign()
                .withf(|key, login| key == "SD-9" && login == "bob")
                .times(1)
                .returning(|_, _| Ok(()));
        })
        .with_audit(|audit| {
            audit
                .expect_record()
                .withf(|entry| !entry.transitioned)
                .times(1)
                .returning(|_| Ok(()));
        })
        .build();

    let outcome = TestHelpers::dispatch(&dispatcher, &TestFixtures::printer_ticket("SD-9")).await;

    assert_eq!(
        outcome,
        TicketOutcome::Routed {
            team: "printers".to_string(),
            assignee: "bob".to_string(),
            open_tickets: 2,
            transitioned: false,
        }
    );
}

/// With assignment after failed transitions disabled the ticket fails untouched
#[tokio::test]
async fn test_transition_failure_aborts_when_disabled() {
    let dispatcher = DispatcherBuilder::new()
        .with_assign_on_transition_failure(false)
        .with_prober(TestHelpers::printer_loads)
        .with_mutator(|mutator| {
            mutator
                .expect_transition_to_in_progress()
                .times(1)
                .returning(|_| Err(DispatchError::backend("transition", "HTTP 400 Bad Request")));
            mutator.expect_assign().times(0);
        })
        .with_audit(|audit| {
            audit.expect_record().times(0);
        })
        .build();

    let result = dispatcher
        .dispatch_ticket(shared::RunId::new(), &TestFixtures::printer_ticket("SD-10"))
        .await;

    assert!(matches!(result, Err(DispatchError::Backend { .. })));
}

/// A failed load count fails the ticket before any mutation
#[tokio::test]
async fn test_load_count_failure_prevents_mutation() {
    let dispatcher = DispatcherBuilder::new()
        .with_prober(|prober| {
            prober
                .expect_count_open_tickets()
                .times(1)
                .returning(|_| Err(DispatchError::backend("search", "HTTP 503")));
        })
        .with_mutator(TestHelpers::untouched_mutator)
        .build();

    let result = dispatcher
        .dispatch_ticket(shared::RunId::new(), &TestFixtures::printer_ticket("SD-11"))
        .await;

    assert!(result.is_err());
}

/// A lost audit line does not change the outcome
#[tokio::test]
async fn test_audit_failure_is_not_fatal() {
    let dispatcher = DispatcherBuilder::new()
        .with_prober(TestHelpers::idle_team)
        .with_mutator(TestHelpers::accepting_mutator)
        .with_audit(|audit| {
            audit.expect_record().times(1).returning(|_| {
                Err(DispatchError::Audit {
                    message: "disk full".to_string(),
                })
            });
        })
        .build();

    let outcome = TestHelpers::dispatch(&dispatcher, &TestFixtures::network_ticket("SD-12")).await;

    assert!(matches!(outcome, TicketOutcome::Routed { .. }));
}
