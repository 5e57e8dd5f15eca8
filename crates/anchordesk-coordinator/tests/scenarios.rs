use std::sync::Arc;

use anchordesk_canonical::{compute_entity_digest, Digest, SubmitterId, TicketId, TxReference};
use anchordesk_coordinator::{
    Actor, ClosureStatus, ConfirmOutcome, Coordinator, CoordinatorConfig, CoordinatorError,
    ManualClock, RejectionCause, Role,
};
use anchordesk_ledger::testkit::{ScriptedLedger, SubmitFault};
use anchordesk_ledger::{
    InMemoryLedger, LedgerClient, LedgerError, NetworkId, RecordAction, RetryPolicy,
};
use chrono::{TimeZone, Utc};

const NETWORK: NetworkId = NetworkId(80002);

fn service_identity() -> SubmitterId {
    SubmitterId::parse("service:anchordesk").unwrap()
}

fn technician() -> Actor {
    Actor::new(SubmitterId::parse("human:alice").unwrap(), Role::ItSupport)
}

fn tx_ref() -> TxReference {
    TxReference::parse(format!("0x{}", "cd".repeat(32))).unwrap()
}

fn fast_config() -> CoordinatorConfig {
    CoordinatorConfig {
        submit_retry: RetryPolicy::immediate(3),
        verify_retry: RetryPolicy::immediate(2),
        required_network: NETWORK,
    }
}

fn harness() -> (Arc<ScriptedLedger>, Arc<Coordinator>, Arc<ManualClock>) {
    let identity = service_identity();
    let ledger = Arc::new(ScriptedLedger::new(InMemoryLedger::new(identity.clone())));
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap(),
    ));
    let coordinator = Arc::new(
        Coordinator::new(ledger.clone(), identity, fast_config()).with_clock(clock.clone()),
    );
    (ledger, coordinator, clock)
}

#[test]
fn direct_path_closes_with_single_record() {
    let (ledger, coordinator, _clock) = harness();

    let receipt = coordinator
        .close_direct(&technician(), "T1", "Replaced the faulty cable")
        .unwrap();

    assert!(receipt.tx_reference.is_some());
    assert_eq!(ledger.total_records().unwrap(), 1);

    let ticket = TicketId::parse("T1").unwrap();
    assert_eq!(coordinator.status(&ticket), Some(ClosureStatus::Closed));

    let record = ledger.verify(&receipt.digest).unwrap().unwrap();
    assert_eq!(record.action, RecordAction::Close);
    assert_eq!(record.entity_digest, compute_entity_digest(&ticket));
}

#[test]
fn both_paths_agree_on_digest_for_identical_input() {
    let (_ledger_a, direct, _clock_a) = harness();
    let (_ledger_b, wallet, _clock_b) = harness();

    let receipt = direct
        .close_direct(&technician(), "T1", "Reimaged the workstation")
        .unwrap();
    let request = wallet
        .begin_wallet_close(&technician(), "T1", "Reimaged the workstation")
        .unwrap();

    // Same ticket, text, and frozen clock instant must anchor the same
    // digest regardless of path.
    assert_eq!(receipt.digest, request.digest);
    assert_eq!(receipt.entity_digest, request.entity_digest);
}

#[test]
fn wallet_path_confirms_after_external_anchor() {
    let (ledger, coordinator, _clock) = harness();
    let wallet_id = SubmitterId::parse("wallet:alice").unwrap();
    ledger.inner().grant(&service_identity(), &wallet_id).unwrap();

    let request = coordinator
        .begin_wallet_close(&technician(), "T1", "Restored the backup")
        .unwrap();
    assert_eq!(request.action, RecordAction::Close);
    assert_eq!(request.required_network, NETWORK);

    // The signing client anchors the digest itself.
    ledger
        .submit(
            &request.digest,
            request.action,
            &request.entity_digest,
            &wallet_id,
            "",
        )
        .unwrap();

    let outcome = coordinator
        .confirm("T1", &request.digest, tx_ref(), NETWORK)
        .unwrap();
    let ConfirmOutcome::Closed(receipt) = outcome else {
        panic!("expected closed outcome");
    };
    assert_eq!(receipt.tx_reference, Some(tx_ref()));
    assert_eq!(
        coordinator.status(&TicketId::parse("T1").unwrap()),
        Some(ClosureStatus::Closed)
    );
}

#[test]
fn confirm_before_anchor_is_visible_stays_pending() {
    let (_ledger, coordinator, _clock) = harness();

    let request = coordinator
        .begin_wallet_close(&technician(), "T1", "Replaced the PSU")
        .unwrap();
    let outcome = coordinator
        .confirm("T1", &request.digest, tx_ref(), NETWORK)
        .unwrap();

    assert_eq!(outcome, ConfirmOutcome::Pending);
    assert_eq!(
        coordinator.status(&TicketId::parse("T1").unwrap()),
        Some(ClosureStatus::AnchorPending)
    );
}

#[test]
fn altered_resolution_digest_rejects_closure() {
    let (_ledger, coordinator, _clock) = harness();

    coordinator
        .begin_wallet_close(&technician(), "T1", "Cleared the print queue")
        .unwrap();

    let forged = Digest::from_bytes([9u8; 32]);
    let err = coordinator
        .confirm("T1", &forged, tx_ref(), NETWORK)
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::DigestMismatch { .. }));

    let ticket = TicketId::parse("T1").unwrap();
    assert_eq!(coordinator.status(&ticket), Some(ClosureStatus::Rejected));
    assert_eq!(
        coordinator.closure(&ticket).unwrap().rejection,
        Some(RejectionCause::DigestMismatch)
    );

    // Never auto-retried: a further confirm is refused outright.
    let err = coordinator
        .confirm("T1", &forged, tx_ref(), NETWORK)
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::ClosureRejected { .. }));

    // But a fresh resolution supersedes the rejected closure.
    assert!(coordinator
        .begin_wallet_close(&technician(), "T1", "Cleared the print queue")
        .is_ok());
}

#[test]
fn foreign_entity_digest_on_the_record_rejects_closure() {
    let (ledger, coordinator, _clock) = harness();
    let wallet_id = SubmitterId::parse("wallet:alice").unwrap();
    ledger.inner().grant(&service_identity(), &wallet_id).unwrap();

    let request = coordinator
        .begin_wallet_close(&technician(), "T1", "Swapped the dock")
        .unwrap();

    // The right closure digest anchored under some other ticket's entity.
    let foreign_entity = compute_entity_digest(&TicketId::parse("T2").unwrap());
    ledger
        .submit(&request.digest, request.action, &foreign_entity, &wallet_id, "")
        .unwrap();

    let err = coordinator
        .confirm("T1", &request.digest, tx_ref(), NETWORK)
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::DigestMismatch { .. }));

    let ticket = TicketId::parse("T1").unwrap();
    assert_eq!(coordinator.status(&ticket), Some(ClosureStatus::Rejected));
    assert_eq!(
        coordinator.closure(&ticket).unwrap().rejection,
        Some(RejectionCause::DigestMismatch)
    );
}

#[test]
fn actor_without_capability_changes_nothing() {
    let (ledger, coordinator, _clock) = harness();
    let requester = Actor::new(SubmitterId::parse("human:bob").unwrap(), Role::Staff);

    let err = coordinator
        .close_direct(&requester, "T1", "Closing my own ticket")
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::CapabilityDenied { .. }));

    assert_eq!(ledger.total_records().unwrap(), 0);
    assert!(coordinator
        .status(&TicketId::parse("T1").unwrap())
        .is_none());
}

#[test]
fn unauthorized_ledger_identity_rejects_closure() {
    let other_owner = SubmitterId::parse("service:someone-else").unwrap();
    let ledger = Arc::new(ScriptedLedger::new(InMemoryLedger::new(other_owner)));
    let coordinator = Coordinator::new(ledger.clone(), service_identity(), fast_config());

    let err = coordinator
        .close_direct(&technician(), "T1", "Replaced the keyboard")
        .unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::Ledger(LedgerError::Unauthorized { .. })
    ));

    assert_eq!(ledger.total_records().unwrap(), 0);
    let closure = coordinator.closure(&TicketId::parse("T1").unwrap()).unwrap();
    assert_eq!(closure.status, ClosureStatus::Rejected);
    assert_eq!(closure.rejection, Some(RejectionCause::Unauthorized));
}

#[test]
fn unknown_outcome_that_landed_is_settled_by_verify() {
    let (ledger, coordinator, _clock) = harness();
    ledger.push_fault(SubmitFault::UnknownButLanded);

    let receipt = coordinator
        .close_direct(&technician(), "T1", "Updated the drivers")
        .unwrap();

    // Settled by lookup, so no receipt-level transaction reference.
    assert!(receipt.tx_reference.is_none());
    assert_eq!(ledger.total_records().unwrap(), 1);
    assert_eq!(
        coordinator.status(&TicketId::parse("T1").unwrap()),
        Some(ClosureStatus::Closed)
    );
}

#[test]
fn unknown_outcome_that_dropped_is_resubmitted() {
    let (ledger, coordinator, _clock) = harness();
    ledger.push_fault(SubmitFault::UnknownAndDropped);

    let receipt = coordinator
        .close_direct(&technician(), "T1", "Rebuilt the user profile")
        .unwrap();

    assert!(receipt.tx_reference.is_some());
    assert_eq!(ledger.total_records().unwrap(), 1);
}

#[test]
fn transient_outages_are_retried_within_budget() {
    let (ledger, coordinator, _clock) = harness();
    ledger.push_fault(SubmitFault::Unavailable);
    ledger.push_fault(SubmitFault::Unavailable);

    assert!(coordinator
        .close_direct(&technician(), "T1", "Reset the password")
        .is_ok());
    assert_eq!(ledger.total_records().unwrap(), 1);
}

#[test]
fn exhausted_submit_budget_rejects_with_cause() {
    let (ledger, coordinator, _clock) = harness();
    for _ in 0..3 {
        ledger.push_fault(SubmitFault::Unavailable);
    }

    let err = coordinator
        .close_direct(&technician(), "T1", "Swapped the monitor")
        .unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::Ledger(LedgerError::Unavailable(_))
    ));

    let closure = coordinator.closure(&TicketId::parse("T1").unwrap()).unwrap();
    assert_eq!(closure.status, ClosureStatus::Rejected);
    assert!(matches!(
        closure.rejection,
        Some(RejectionCause::SubmitFailed(_))
    ));
    assert_eq!(ledger.total_records().unwrap(), 0);
}

#[test]
fn closed_ticket_refuses_further_closures() {
    let (_ledger, coordinator, _clock) = harness();
    coordinator
        .close_direct(&technician(), "T1", "Patched the OS")
        .unwrap();

    let err = coordinator
        .close_direct(&technician(), "T1", "Patched the OS again")
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::AlreadyClosed { .. }));
}

#[test]
fn in_flight_closure_refuses_a_second_path() {
    let (_ledger, coordinator, _clock) = harness();
    coordinator
        .begin_wallet_close(&technician(), "T1", "Replaced the battery")
        .unwrap();

    let err = coordinator
        .close_direct(&technician(), "T1", "Replaced the battery")
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::ClosureInFlight { .. }));
}

#[test]
fn wrong_network_confirmation_is_refused_without_poisoning() {
    let (_ledger, coordinator, _clock) = harness();
    let request = coordinator
        .begin_wallet_close(&technician(), "T1", "Reconnected the printer")
        .unwrap();

    let err = coordinator
        .confirm("T1", &request.digest, tx_ref(), NetworkId(1))
        .unwrap_err();
    assert!(matches!(
        err,
        CoordinatorError::NetworkMismatch {
            expected: NetworkId(80002),
            actual: NetworkId(1),
        }
    ));

    // The closure survives and can still be confirmed on the right network.
    assert_eq!(
        coordinator.status(&TicketId::parse("T1").unwrap()),
        Some(ClosureStatus::AnchorPending)
    );
    assert_eq!(
        coordinator
            .confirm("T1", &request.digest, tx_ref(), NETWORK)
            .unwrap(),
        ConfirmOutcome::Pending
    );
}

#[test]
fn confirm_for_unknown_ticket_fails() {
    let (_ledger, coordinator, _clock) = harness();
    let err = coordinator
        .confirm("T404", &Digest::from_bytes([1u8; 32]), tx_ref(), NETWORK)
        .unwrap_err();
    assert!(matches!(err, CoordinatorError::UnknownTicket { .. }));
}
