//! Integration test: racing callers against a shared engine.

use bondsman_core::{BondError, BondId, BondPhase};
use bondsman_integration_tests::{alice, arbiter, bob, Harness};
use bondsman_registry::RegistryError;
use futures::future::join_all;
use std::collections::HashSet;

#[tokio::test]
async fn test_concurrent_closes_pay_once() {
    let h = Harness::new();
    let id = h.confirmed_bond(1000).await.unwrap();
    let admin = arbiter();

    let results = join_all((0..16).map(|_| h.engine.close_bond(id, &admin))).await;

    let ok = results.iter().filter(|r| r.is_ok()).count();
    let repeats = results
        .iter()
        .filter(|r| matches!(r, Err(RegistryError::Bond(BondError::AlreadyCompleted))))
        .count();
    assert_eq!(ok, 1);
    assert_eq!(repeats, 15);
    assert_eq!(h.rail.balance_of(&alice()), 900);
    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 100);
    assert_eq!(h.engine.ledger_summary(&arbiter()).await.unwrap().escrowed, 0);
}

#[tokio::test]
async fn test_concurrent_closes_across_tasks() {
    let h = Harness::new();
    let id = h.confirmed_bond(2000).await.unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let engine = h.engine.clone();
            tokio::spawn(async move { engine.close_bond(id, &arbiter()).await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        if handle.await.expect("task panicked").is_ok() {
            ok += 1;
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(h.rail.balance_of(&alice()), 1800);
}

#[tokio::test]
async fn test_concurrent_creates_get_unique_ids() {
    let h = Harness::new();

    let handles: Vec<_> = (0..32)
        .map(|i| {
            let engine = h.engine.clone();
            tokio::spawn(async move {
                engine
                    .create_bond(&alice(), &format!("bond {i}"), 100 + i, &bob())
                    .await
            })
        })
        .collect();

    let mut ids = HashSet::new();
    for handle in handles {
        let id = handle.await.expect("task panicked").expect("create");
        assert!(ids.insert(id), "duplicate id {id}");
    }

    let expected: HashSet<BondId> = (1..=32).map(BondId).collect();
    assert_eq!(ids, expected);
    assert_eq!(h.engine.bond_count(), 32);
}

#[tokio::test]
async fn test_concurrent_second_party_confirms_escrow_once() {
    let h = Harness::new();
    let id = h.validated_bond(700).await.unwrap();
    let payer = bob();

    let results = join_all((0..10).map(|_| h.engine.confirm(id, &payer, 700))).await;

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results.iter().filter_map(|r| r.as_ref().err()).all(|e| matches!(
        e,
        RegistryError::Bond(BondError::AlreadyConfirmed(_))
    )));
    assert_eq!(h.engine.ledger_summary(&arbiter()).await.unwrap().escrowed, 700);
    assert_eq!(
        h.engine.view_bond(id).await.unwrap().phase,
        BondPhase::PartiallyConfirmed
    );
}

#[tokio::test]
async fn test_independent_bonds_close_in_parallel() {
    let h = Harness::new();
    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(h.confirmed_bond(1000).await.unwrap());
    }
    let admin = arbiter();

    let results = join_all(ids.iter().map(|id| h.engine.close_bond(*id, &admin))).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(h.rail.balance_of(&alice()), 4500);
    assert_eq!(h.engine.accrued_fees(&arbiter()).await.unwrap(), 500);
}
