//! Integration test: bond lifecycle across the registry, ledger, and rail.

use bondsman_core::{BondError, BondId, BondNotification, BondPhase, EngineConfig, Identity, Party};
use bondsman_integration_tests::{alice, arbiter, bob, Harness};
use bondsman_registry::RegistryError;

fn bond_err<T: std::fmt::Debug>(result: Result<T, RegistryError>) -> BondError {
    match result {
        Err(RegistryError::Bond(e)) => e,
        other => panic!("expected a bond error, got {other:?}"),
    }
}

// =========================================================================
// Happy path
// =========================================================================

#[tokio::test]
async fn test_thousand_unit_round_trip() {
    let h = Harness::new();
    let mut events = h.engine.subscribe();

    let id = h
        .engine
        .create_bond(&alice(), "storefront", 1000, &bob())
        .await
        .expect("create");
    assert_eq!(id, BondId(1));
    assert_eq!(h.engine.view_bond(id).await.unwrap().phase, BondPhase::Created);

    h.engine.sign_bond(id, &bob()).await.expect("sign");
    assert_eq!(h.engine.view_bond(id).await.unwrap().phase, BondPhase::Signed);

    h.engine.validate_bond(id, &arbiter()).await.expect("validate");
    assert_eq!(h.engine.view_bond(id).await.unwrap().phase, BondPhase::Validated);

    h.engine.confirm(id, &bob(), 1000).await.expect("second party confirms");
    assert_eq!(
        h.engine.view_bond(id).await.unwrap().phase,
        BondPhase::PartiallyConfirmed
    );
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 1000);

    h.engine.confirm(id, &alice(), 0).await.expect("creator confirms");
    assert_eq!(
        h.engine.view_bond(id).await.unwrap().phase,
        BondPhase::FullyConfirmed
    );

    let escrow_before = h.engine.ledger_summary(&arbiter()).await.unwrap().escrowed;
    let closed = h.engine.close_bond(id, &arbiter()).await.expect("close");
    let escrow_after = h.engine.ledger_summary(&arbiter()).await.unwrap().escrowed;

    assert_eq!(closed.payout, 900);
    assert_eq!(closed.fee, 100);
    assert_eq!(h.rail.balance_of(&alice()), 900);
    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 100);
    assert_eq!(escrow_before - escrow_after, 1000);
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 100);

    let view = h.engine.view_bond(id).await.unwrap();
    assert!(view.signed && view.validated && view.completed);
    assert_eq!(view.phase, BondPhase::Completed);

    match events.recv().await.unwrap() {
        BondNotification::Created(created) => {
            assert_eq!(created.id, id);
            assert_eq!(created.name, "storefront");
        }
        other => panic!("unexpected notification {other:?}"),
    }
    match events.recv().await.unwrap() {
        BondNotification::Closed(c) => assert_eq!(c.payout, 900),
        other => panic!("unexpected notification {other:?}"),
    }
}

#[tokio::test]
async fn test_payout_plus_fee_equals_amount() {
    for (amount, fee_percent) in [(100, 10), (155, 10), (999, 7), (1_000_003, 33), (250, 0), (250, 100)] {
        let h = Harness::with_config(EngineConfig::new(arbiter()).with_fee_percent(fee_percent));
        let id = h.confirmed_bond(amount).await.unwrap();
        let closed = h.engine.close_bond(id, &arbiter()).await.unwrap();

        assert_eq!(closed.payout + closed.fee, amount, "amount {amount} at {fee_percent}%");
        assert_eq!(h.rail.balance_of(&alice()), closed.payout);
        assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), closed.fee);
        assert_eq!(h.engine.ledger_summary(&arbiter()).await.unwrap().escrowed, 0);
    }
}

#[tokio::test]
async fn test_confirmation_order_is_free() {
    let h = Harness::new();
    let id = h.validated_bond(500).await.unwrap();

    h.engine.confirm(id, &alice(), 0).await.unwrap();
    let view = h.engine.view_bond(id).await.unwrap();
    assert!(view.confirmations.is_set(Party::First));
    assert!(!view.confirmations.is_set(Party::Second));

    h.engine.confirm(id, &bob(), 500).await.unwrap();
    assert!(h.engine.close_bond(id, &arbiter()).await.is_ok());
}

// =========================================================================
// Rejections
// =========================================================================

#[tokio::test]
async fn test_nobody_else_can_drive_the_bond() {
    let h = Harness::new();
    let mallory = Identity::from("mallory");
    let id = h
        .engine
        .create_bond(&alice(), "guarded", 1000, &bob())
        .await
        .unwrap();

    assert!(matches!(
        bond_err(h.engine.sign_bond(id, &mallory).await),
        BondError::Unauthorized { .. }
    ));
    h.engine.sign_bond(id, &bob()).await.unwrap();

    assert!(matches!(
        bond_err(h.engine.validate_bond(id, &bob()).await),
        BondError::Unauthorized { .. }
    ));
    h.engine.validate_bond(id, &arbiter()).await.unwrap();

    assert!(matches!(
        bond_err(h.engine.confirm(id, &mallory, 1000).await),
        BondError::Unauthorized { .. }
    ));
    h.engine.confirm(id, &alice(), 0).await.unwrap();
    h.engine.confirm(id, &bob(), 1000).await.unwrap();

    for actor in [alice(), bob(), mallory, Identity::null()] {
        assert!(matches!(
            bond_err(h.engine.close_bond(id, &actor).await),
            BondError::Unauthorized { .. }
        ));
    }
    assert!(!h.engine.view_bond(id).await.unwrap().completed);
    assert_eq!(h.rail.receipt_count(), 0);
}

#[tokio::test]
async fn test_wrong_tender_moves_nothing() {
    let h = Harness::new();
    let id = h.validated_bond(1000).await.unwrap();

    for tendered in [0, 999, 1001] {
        assert_eq!(
            bond_err(h.engine.confirm(id, &bob(), tendered).await),
            BondError::WrongAmount {
                expected: 1000,
                tendered
            }
        );
    }
    assert_eq!(
        bond_err(h.engine.confirm(id, &alice(), 1).await),
        BondError::UnexpectedValue(1)
    );

    let summary = h.engine.ledger_summary(&arbiter()).await.unwrap();
    assert_eq!(summary.escrowed, 0);
    assert_eq!(
        h.engine.view_bond(id).await.unwrap().phase,
        BondPhase::Validated
    );
}

#[tokio::test]
async fn test_every_transition_rejects_a_repeat() {
    let h = Harness::new();
    let id = h
        .engine
        .create_bond(&alice(), "repeat", 1000, &bob())
        .await
        .unwrap();

    h.engine.sign_bond(id, &bob()).await.unwrap();
    assert_eq!(bond_err(h.engine.sign_bond(id, &bob()).await), BondError::AlreadySigned);

    h.engine.validate_bond(id, &arbiter()).await.unwrap();
    assert_eq!(
        bond_err(h.engine.validate_bond(id, &arbiter()).await),
        BondError::AlreadyValidated
    );

    h.engine.confirm(id, &bob(), 1000).await.unwrap();
    assert_eq!(
        bond_err(h.engine.confirm(id, &bob(), 1000).await),
        BondError::AlreadyConfirmed(Party::Second)
    );
    h.engine.confirm(id, &alice(), 0).await.unwrap();
    assert_eq!(
        bond_err(h.engine.confirm(id, &alice(), 0).await),
        BondError::AlreadyConfirmed(Party::First)
    );

    h.engine.close_bond(id, &arbiter()).await.unwrap();
    assert_eq!(
        bond_err(h.engine.close_bond(id, &arbiter()).await),
        BondError::AlreadyCompleted
    );
    assert_eq!(h.engine.custodial_balance(&arbiter()).await.unwrap(), 100);
}

#[tokio::test]
async fn test_creation_validation() {
    let h = Harness::with_config(EngineConfig::new(arbiter()).with_min_amount(500));

    assert_eq!(
        bond_err(h.engine.create_bond(&alice(), "", 1000, &bob()).await),
        BondError::InvalidName
    );
    assert_eq!(
        bond_err(h.engine.create_bond(&alice(), "small", 499, &bob()).await),
        BondError::AmountBelowMinimum {
            amount: 499,
            minimum: 500
        }
    );
    assert!(matches!(
        bond_err(h.engine.create_bond(&alice(), "self", 1000, &alice()).await),
        BondError::InvalidSecondParty(_)
    ));
    assert!(matches!(
        bond_err(h.engine.create_bond(&alice(), "null", 1000, &Identity::null()).await),
        BondError::InvalidSecondParty(_)
    ));
    assert_eq!(h.engine.bond_count(), 0);

    assert_eq!(
        h.engine.create_bond(&alice(), "exact", 500, &bob()).await.unwrap(),
        BondId(1)
    );
}

#[tokio::test]
async fn test_unknown_bond_everywhere() {
    let h = Harness::new();
    let missing = BondId(77);
    let expected = BondError::NotFound(missing);

    assert_eq!(bond_err(h.engine.view_bond(missing).await), expected);
    assert_eq!(bond_err(h.engine.sign_bond(missing, &bob()).await), expected);
    assert_eq!(bond_err(h.engine.validate_bond(missing, &arbiter()).await), expected);
    assert_eq!(bond_err(h.engine.confirm(missing, &bob(), 1000).await), expected);
    assert_eq!(bond_err(h.engine.close_bond(missing, &arbiter()).await), expected);
}

// =========================================================================
// Persistence
// =========================================================================

#[tokio::test]
async fn test_state_survives_reopen() {
    let h = Harness::new();
    let done = h.confirmed_bond(1000).await.unwrap();
    h.engine.close_bond(done, &arbiter()).await.unwrap();
    let open = h.validated_bond(300).await.unwrap();
    h.engine.confirm(open, &bob(), 300).await.unwrap();

    let reopened = h.reopen(EngineConfig::new(arbiter())).unwrap();
    assert_eq!(reopened.bond_count(), 2);
    assert!(reopened.view_bond(done).await.unwrap().completed);
    assert_eq!(
        reopened.view_bond(open).await.unwrap().phase,
        BondPhase::PartiallyConfirmed
    );

    let summary = reopened.ledger_summary(&arbiter()).await.unwrap();
    assert_eq!(summary.escrowed, 300);
    assert_eq!(summary.accrued_fees, 100);

    reopened.confirm(open, &alice(), 0).await.unwrap();
    let closed = reopened.close_bond(open, &arbiter()).await.unwrap();
    assert_eq!(closed.payout, 270);
    assert_eq!(
        reopened.create_bond(&alice(), "next", 100, &bob()).await.unwrap(),
        BondId(3)
    );
}

#[tokio::test]
async fn test_list_reflects_every_bond() {
    let h = Harness::new();
    let first = h.confirmed_bond(1000).await.unwrap();
    h.engine.close_bond(first, &arbiter()).await.unwrap();
    h.validated_bond(200).await.unwrap();
    h.engine
        .create_bond(&alice(), "fresh", 100, &bob())
        .await
        .unwrap();

    let phases: Vec<BondPhase> = h
        .engine
        .list_bonds()
        .await
        .into_iter()
        .map(|v| v.phase)
        .collect();
    assert_eq!(
        phases,
        vec![BondPhase::Completed, BondPhase::Validated, BondPhase::Created]
    );
}
