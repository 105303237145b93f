//! Integration test: fee accrual, withdrawal, and custody accounting.

use bondsman_core::{BondNotification, BondPhase, EngineConfig, Identity};
use bondsman_integration_tests::{alice, arbiter, bob, Harness};
use bondsman_ledger::LedgerError;
use bondsman_registry::{BondStore, RegistryError};

async fn close_one(h: &Harness, amount: u128) {
    let id = h.confirmed_bond(amount).await.expect("confirmed bond");
    h.engine.close_bond(id, &arbiter()).await.expect("close");
}

// =========================================================================
// Withdrawal
// =========================================================================

#[tokio::test]
async fn test_withdraw_sends_everything_accrued() {
    let h = Harness::new();
    let mut events = h.engine.subscribe();
    close_one(&h, 1000).await;
    close_one(&h, 550).await;

    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 155);
    let sent = h.engine.withdraw_fees(&arbiter()).await.unwrap();

    assert_eq!(sent, 155);
    assert_eq!(h.rail.balance_of(&arbiter()), 155);
    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 0);
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 0);

    let mut withdrawn = None;
    while let Ok(notification) = events.try_recv() {
        if let BondNotification::FeesWithdrawn { amount } = notification {
            withdrawn = Some(amount);
        }
    }
    assert_eq!(withdrawn, Some(155));
}

#[tokio::test]
async fn test_withdraw_requires_arbiter() {
    let h = Harness::new();
    close_one(&h, 1000).await;

    for actor in [alice(), bob(), Identity::null()] {
        match h.engine.withdraw_fees(&actor).await {
            Err(RegistryError::Ledger(LedgerError::Unauthorized { .. })) => {}
            other => panic!("expected Unauthorized, got {other:?}"),
        }
    }
    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 100);
    assert_eq!(h.rail.balance_of(&alice()), 900);
}

#[tokio::test]
async fn test_empty_withdrawal_is_a_no_op() {
    let h = Harness::new();
    let mut events = h.engine.subscribe();

    assert_eq!(h.engine.withdraw_fees(&arbiter()).await.unwrap(), 0);
    assert_eq!(h.rail.receipt_count(), 0);
    assert!(events.try_recv().is_err());

    close_one(&h, 1000).await;
    h.engine.withdraw_fees(&arbiter()).await.unwrap();
    let receipts = h.rail.receipt_count();
    assert_eq!(h.engine.withdraw_fees(&arbiter()).await.unwrap(), 0);
    assert_eq!(h.rail.receipt_count(), receipts);
}

#[tokio::test]
async fn test_rejected_withdrawal_keeps_fees() {
    let h = Harness::new();
    close_one(&h, 1000).await;
    h.rail.reject(&arbiter(), "account frozen");

    match h.engine.withdraw_fees(&arbiter()).await {
        Err(RegistryError::Ledger(LedgerError::TransferRejected { amount, .. })) => {
            assert_eq!(amount, 100)
        }
        other => panic!("expected TransferRejected, got {other:?}"),
    }
    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 100);

    h.rail.accept(&arbiter());
    assert_eq!(h.engine.withdraw_fees(&arbiter()).await.unwrap(), 100);
    assert_eq!(h.rail.balance_of(&arbiter()), 100);
}

// =========================================================================
// Custody
// =========================================================================

#[tokio::test]
async fn test_custody_is_escrow_plus_fees() {
    let h = Harness::new();

    let open = h.validated_bond(400).await.unwrap();
    h.engine.confirm(open, &bob(), 400).await.unwrap();
    close_one(&h, 1000).await;

    let summary = h.engine.ledger_summary(&arbiter()).await.unwrap();
    assert_eq!(summary.escrowed, 400);
    assert_eq!(summary.accrued_fees, 100);
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 500);

    h.engine.withdraw_fees(&arbiter()).await.unwrap();
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 400);
}

#[tokio::test]
async fn test_ledger_reads_are_arbiter_only() {
    let h = Harness::new();
    assert!(matches!(
        h.engine.accrued_fees(&alice()).await,
        Err(RegistryError::Ledger(LedgerError::Unauthorized { .. }))
    ));
    assert!(matches!(
        h.engine.custodial_balance(&bob()).await,
        Err(RegistryError::Ledger(LedgerError::Unauthorized { .. }))
    ));
    assert!(matches!(
        h.engine.ledger_summary(&Identity::null()).await,
        Err(RegistryError::Ledger(LedgerError::Unauthorized { .. }))
    ));
}

#[tokio::test]
async fn test_rejected_payout_leaves_bond_closable() {
    let h = Harness::new();
    let id = h.confirmed_bond(1000).await.unwrap();
    h.rail.reject(&alice(), "account closed");

    match h.engine.close_bond(id, &arbiter()).await {
        Err(RegistryError::Ledger(LedgerError::TransferRejected { amount, .. })) => {
            assert_eq!(amount, 900)
        }
        other => panic!("expected TransferRejected, got {other:?}"),
    }
    assert!(!h.engine.view_bond(id).await.unwrap().completed);
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 1000);
    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 0);

    h.rail.accept(&alice());
    let closed = h.engine.close_bond(id, &arbiter()).await.unwrap();
    assert_eq!(closed.payout, 900);
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 100);
}

#[tokio::test]
async fn test_ledger_figures_reach_the_store() {
    let h = Harness::new();
    let open = h.validated_bond(300).await.unwrap();
    h.engine.confirm(open, &bob(), 300).await.unwrap();
    close_one(&h, 1000).await;

    let stored = h.store.ledger().unwrap().expect("ledger persisted");
    assert_eq!(stored.escrowed, 300);
    assert_eq!(stored.accrued_fees, 100);

    h.engine.withdraw_fees(&arbiter()).await.unwrap();
    let stored = h.store.ledger().unwrap().expect("ledger persisted");
    assert_eq!(stored.accrued_fees, 0);
}

#[tokio::test]
async fn test_escrow_that_cannot_be_stored_is_refused() {
    let h = Harness::new();
    let id = h.validated_bond(1000).await.unwrap();
    h.engine.confirm(id, &alice(), 0).await.unwrap();

    h.store.set_failing_ledger(true);
    assert!(matches!(
        h.engine.confirm(id, &bob(), 1000).await,
        Err(RegistryError::Storage(_))
    ));
    assert_eq!(h.engine.ledger_summary(&arbiter()).await.unwrap().escrowed, 0);

    let reopened = h.reopen(EngineConfig::new(arbiter())).unwrap();
    assert_eq!(
        reopened.view_bond(id).await.unwrap().phase,
        BondPhase::PartiallyConfirmed
    );
    assert_eq!(reopened.ledger_summary(&arbiter()).await.unwrap().escrowed, 0);

    h.store.set_failing_ledger(false);
    reopened.confirm(id, &bob(), 1000).await.unwrap();

    let restarted = h.reopen(EngineConfig::new(arbiter())).unwrap();
    assert_eq!(restarted.ledger_summary(&arbiter()).await.unwrap().escrowed, 1000);
    let closed = restarted.close_bond(id, &arbiter()).await.unwrap();
    assert_eq!(closed.payout, 900);
    assert_eq!(restarted.custodial_balance(&arbiter()).await.unwrap(), 100);
}
