use async_trait::async_trait;
use bondsman_core::{Amount, Identity};

use crate::error::LedgerError;
use crate::types::{LedgerSnapshot, TransferMemo, TransferReceipt};

/// Value-transfer rail interface.
///
/// Each implementation moves value out of the engine's custody to an
/// external identity (a bank rail, a chain, an internal book). A transfer
/// either completes and returns a receipt, or fails and moves nothing.
#[async_trait]
pub trait ITransfer: Send + Sync {
    /// Move `amount` out of custody to `to`.
    async fn transfer(
        &self,
        to: &Identity,
        amount: Amount,
        memo: TransferMemo,
    ) -> Result<TransferReceipt, LedgerError>;

    /// Return the unique identifier of this rail (e.g. "rail-internal").
    fn rail_id(&self) -> &str;
}

/// Receives the ledger figures on every change, while the book is still
/// locked, so snapshots arrive in commit order.
///
/// Escrow intake records the new figures before applying them and backs out
/// on error. Payouts and withdrawals record after value has left custody, so
/// an error there is only logged.
pub trait SnapshotSink: Send + Sync {
    fn record(&self, snapshot: &LedgerSnapshot) -> Result<(), LedgerError>;
}
