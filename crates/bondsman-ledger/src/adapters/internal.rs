use async_trait::async_trait;
use bondsman_core::{Amount, Identity};
use chrono::Utc;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use uuid::Uuid;

use crate::error::LedgerError;
use crate::traits::ITransfer;
use crate::types::{TransferId, TransferMemo, TransferReceipt};

/// In-memory transfer rail.
///
/// Credits payee balances in a local book and keeps every receipt. Payees
/// can be marked as rejecting, and the whole rail can be taken offline, to
/// exercise failure paths.
pub struct InternalRail {
    /// Executed transfers keyed by TransferId.
    receipts: DashMap<Uuid, TransferReceipt>,
    /// Total value received per payee.
    balances: DashMap<Identity, Amount>,
    /// Payees that refuse incoming value, with the reason reported.
    rejecting: DashMap<Identity, String>,
    offline: AtomicBool,
}

impl InternalRail {
    pub fn new() -> Self {
        Self {
            receipts: DashMap::new(),
            balances: DashMap::new(),
            rejecting: DashMap::new(),
            offline: AtomicBool::new(false),
        }
    }

    /// Total value delivered to `who` so far.
    pub fn balance_of(&self, who: &Identity) -> Amount {
        self.balances.get(who).map(|v| *v).unwrap_or(0)
    }

    /// Make every future transfer to `who` fail.
    pub fn reject(&self, who: &Identity, reason: impl Into<String>) {
        self.rejecting.insert(who.clone(), reason.into());
    }

    /// Undo [`InternalRail::reject`].
    pub fn accept(&self, who: &Identity) {
        self.rejecting.remove(who);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn receipt_count(&self) -> usize {
        self.receipts.len()
    }

    /// All receipts, oldest first.
    pub fn receipts(&self) -> Vec<TransferReceipt> {
        let mut all: Vec<TransferReceipt> = self.receipts.iter().map(|r| r.value().clone()).collect();
        all.sort_by_key(|r| r.transfer_id.0);
        all
    }
}

impl Default for InternalRail {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ITransfer for InternalRail {
    async fn transfer(
        &self,
        to: &Identity,
        amount: Amount,
        memo: TransferMemo,
    ) -> Result<TransferReceipt, LedgerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(LedgerError::TransferRejected {
                to: to.to_string(),
                amount,
                reason: "rail offline".into(),
            });
        }
        if to.is_null() {
            return Err(LedgerError::TransferRejected {
                to: to.to_string(),
                amount,
                reason: "null payee".into(),
            });
        }
        if let Some(reason) = self.rejecting.get(to) {
            return Err(LedgerError::TransferRejected {
                to: to.to_string(),
                amount,
                reason: reason.value().clone(),
            });
        }

        self.balances
            .entry(to.clone())
            .and_modify(|b| *b += amount)
            .or_insert(amount);

        let receipt = TransferReceipt {
            transfer_id: TransferId::new(),
            rail_id: self.rail_id().to_string(),
            to: to.clone(),
            amount,
            memo,
            executed_at: Utc::now(),
        };
        self.receipts.insert(receipt.transfer_id.0, receipt.clone());

        tracing::info!(
            transfer_id = %receipt.transfer_id,
            to = %to,
            amount = %amount,
            memo = %memo,
            "internal transfer executed"
        );
        Ok(receipt)
    }

    fn rail_id(&self) -> &str {
        "rail-internal"
    }
}
