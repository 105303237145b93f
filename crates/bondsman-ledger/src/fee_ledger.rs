use bondsman_core::{Amount, BondId, FeeSplit, Identity};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::LedgerError;
use crate::traits::{ITransfer, SnapshotSink};
use crate::types::{LedgerSnapshot, TransferMemo, TransferReceipt};

/// Outcome of paying out a closed bond.
#[derive(Debug, Clone)]
pub struct Settlement {
    pub bond_id: BondId,
    pub split: FeeSplit,
    /// `None` when the payout was zero and no transfer was needed.
    pub receipt: Option<TransferReceipt>,
    pub snapshot: LedgerSnapshot,
}

/// Outcome of a fee withdrawal.
#[derive(Debug, Clone)]
pub struct Withdrawal {
    pub amount: Amount,
    /// `None` when there was nothing to withdraw.
    pub receipt: Option<TransferReceipt>,
    pub snapshot: LedgerSnapshot,
}

/// Custody book for escrowed value and accrued platform fees.
///
/// The book sits behind its own async mutex, held across the outbound
/// transfer so that figures only move once the rail has confirmed. At every
/// point outside the lock, `custodial_balance == escrowed + accrued_fees`.
pub struct FeeLedger {
    arbiter: Identity,
    rail: Arc<dyn ITransfer>,
    book: Mutex<LedgerSnapshot>,
    journal: Option<Arc<dyn SnapshotSink>>,
}

impl FeeLedger {
    /// Create an empty ledger.
    pub fn new(arbiter: Identity, rail: Arc<dyn ITransfer>) -> Self {
        Self::restore(arbiter, rail, LedgerSnapshot::default())
    }

    /// Rebuild a ledger from persisted figures.
    pub fn restore(arbiter: Identity, rail: Arc<dyn ITransfer>, snapshot: LedgerSnapshot) -> Self {
        tracing::info!(
            rail_id = %rail.rail_id(),
            escrowed = %snapshot.escrowed,
            accrued_fees = %snapshot.accrued_fees,
            "fee ledger ready"
        );
        Self {
            arbiter,
            rail,
            book: Mutex::new(snapshot),
            journal: None,
        }
    }

    /// Report every change of figures to `journal`.
    pub fn with_journal(mut self, journal: Arc<dyn SnapshotSink>) -> Self {
        self.journal = Some(journal);
        self
    }

    fn journal(&self, snapshot: &LedgerSnapshot) -> Result<(), LedgerError> {
        match &self.journal {
            Some(journal) => journal.record(snapshot),
            None => Ok(()),
        }
    }

    /// Journal figures that are already final. Value has left custody by now,
    /// so a failed write cannot be backed out.
    fn journal_settled(&self, snapshot: &LedgerSnapshot) {
        if let Err(e) = self.journal(snapshot) {
            tracing::error!(
                escrowed = %snapshot.escrowed,
                accrued_fees = %snapshot.accrued_fees,
                error = %e,
                "failed to journal ledger figures"
            );
        }
    }

    pub fn arbiter(&self) -> &Identity {
        &self.arbiter
    }

    pub fn rail_id(&self) -> &str {
        self.rail.rail_id()
    }

    /// Current figures, without an authorization check. For persistence.
    pub async fn snapshot(&self) -> LedgerSnapshot {
        *self.book.lock().await
    }

    fn authorize(&self, actor: &Identity, action: &'static str) -> Result<(), LedgerError> {
        if actor.is_null() || actor != &self.arbiter {
            return Err(LedgerError::Unauthorized {
                actor: actor.to_string(),
                action,
            });
        }
        Ok(())
    }

    /// Take a second party's tender into escrow custody.
    ///
    /// The new figures go to the journal first. If that write fails the
    /// escrow total is left as it was and the error is returned.
    pub async fn deposit_escrow(
        &self,
        bond_id: BondId,
        from: &Identity,
        amount: Amount,
    ) -> Result<LedgerSnapshot, LedgerError> {
        self.deposit_escrow_with(bond_id, from, amount, |snapshot| self.journal(snapshot))
            .await
    }

    /// Like [`FeeLedger::deposit_escrow`], but `persist` replaces the journal
    /// for this change. It runs under the book lock with the figures about to
    /// be applied, and an error from it leaves the book untouched. Callers use
    /// it to store the ledger figures together with their own records.
    pub async fn deposit_escrow_with<F, E>(
        &self,
        bond_id: BondId,
        from: &Identity,
        amount: Amount,
        persist: F,
    ) -> Result<LedgerSnapshot, E>
    where
        F: FnOnce(&LedgerSnapshot) -> Result<(), E>,
        E: From<LedgerError>,
    {
        let mut book = self.book.lock().await;
        let escrowed = book.escrowed.checked_add(amount).ok_or_else(|| {
            LedgerError::Internal(format!("escrow overflow depositing {amount}"))
        })?;
        let next = LedgerSnapshot {
            escrowed,
            ..*book
        };
        if let Err(e) = persist(&next) {
            tracing::warn!(
                bond_id = %bond_id,
                amount = %amount,
                "escrow intake not persisted, deposit refused"
            );
            return Err(e);
        }
        *book = next;

        tracing::info!(
            bond_id = %bond_id,
            from = %from,
            amount = %amount,
            escrowed = %book.escrowed,
            "escrow deposited"
        );
        Ok(*book)
    }

    /// Pay out a closed bond: `split.payout` to `payee`, `split.fee` into
    /// accrued fees, `split.total()` out of escrow.
    ///
    /// If the transfer fails nothing moves and the error is returned.
    pub async fn settle(
        &self,
        bond_id: BondId,
        payee: &Identity,
        split: FeeSplit,
    ) -> Result<Settlement, LedgerError> {
        let mut book = self.book.lock().await;
        let total = split.total();
        if book.escrowed < total {
            return Err(LedgerError::InsufficientCustody {
                available: book.escrowed,
                required: total,
            });
        }
        let accrued = book.accrued_fees.checked_add(split.fee).ok_or_else(|| {
            LedgerError::Internal(format!("fee accumulator overflow adding {}", split.fee))
        })?;

        let receipt = if split.payout > 0 {
            Some(
                self.rail
                    .transfer(payee, split.payout, TransferMemo::BondPayout(bond_id))
                    .await?,
            )
        } else {
            None
        };

        book.escrowed -= total;
        book.accrued_fees = accrued;
        self.journal_settled(&book);

        tracing::info!(
            bond_id = %bond_id,
            payee = %payee,
            payout = %split.payout,
            fee = %split.fee,
            accrued_fees = %book.accrued_fees,
            "bond settled"
        );
        Ok(Settlement {
            bond_id,
            split,
            receipt,
            snapshot: *book,
        })
    }

    /// Transfer all accrued fees to the arbiter.
    ///
    /// The accumulator is zeroed only after the transfer succeeds. With
    /// nothing accrued this is a no-op that returns an amount of 0.
    pub async fn withdraw_fees(&self, actor: &Identity) -> Result<Withdrawal, LedgerError> {
        self.authorize(actor, "withdraw fees")?;

        let mut book = self.book.lock().await;
        let amount = book.accrued_fees;
        if amount == 0 {
            tracing::debug!("fee withdrawal with nothing accrued");
            return Ok(Withdrawal {
                amount,
                receipt: None,
                snapshot: *book,
            });
        }

        let receipt = match self
            .rail
            .transfer(&self.arbiter, amount, TransferMemo::FeeWithdrawal)
            .await
        {
            Ok(receipt) => receipt,
            Err(e) => {
                tracing::warn!(amount = %amount, error = %e, "fee withdrawal failed, fees kept");
                return Err(e);
            }
        };
        book.accrued_fees = 0;
        self.journal_settled(&book);

        tracing::info!(amount = %amount, transfer_id = %receipt.transfer_id, "fees withdrawn");
        Ok(Withdrawal {
            amount,
            receipt: Some(receipt),
            snapshot: *book,
        })
    }

    /// Arbiter-only read of the fee accumulator.
    pub async fn accrued_fees(&self, actor: &Identity) -> Result<Amount, LedgerError> {
        self.authorize(actor, "read accrued fees")?;
        Ok(self.book.lock().await.accrued_fees)
    }

    /// Arbiter-only read of everything held: escrow plus accrued fees.
    pub async fn custodial_balance(&self, actor: &Identity) -> Result<Amount, LedgerError> {
        self.authorize(actor, "read the custodial balance")?;
        Ok(self.book.lock().await.custodial_balance())
    }

    /// Arbiter-only read of unsettled escrow.
    pub async fn escrowed(&self, actor: &Identity) -> Result<Amount, LedgerError> {
        self.authorize(actor, "read escrow")?;
        Ok(self.book.lock().await.escrowed)
    }

    /// Arbiter-only read of all figures at once.
    pub async fn summary(&self, actor: &Identity) -> Result<LedgerSnapshot, LedgerError> {
        self.authorize(actor, "read the ledger")?;
        Ok(*self.book.lock().await)
    }
}
