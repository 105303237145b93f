use bondsman_core::{Amount, BondId, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an executed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferId(pub Uuid);

impl TransferId {
    /// Create a new transfer ID (UUID v7, time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for TransferId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TransferId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why value is leaving custody.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransferMemo {
    /// Payout of a closed bond to its creator.
    BondPayout(BondId),
    /// Accrued fees withdrawn by the arbiter.
    FeeWithdrawal,
}

impl std::fmt::Display for TransferMemo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BondPayout(id) => write!(f, "payout:bond-{}", id),
            Self::FeeWithdrawal => write!(f, "fee-withdrawal"),
        }
    }
}

/// Proof that value left custody.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    pub transfer_id: TransferId,
    /// Rail that executed the transfer.
    pub rail_id: String,
    pub to: Identity,
    pub amount: Amount,
    pub memo: TransferMemo,
    pub executed_at: DateTime<Utc>,
}

/// Point-in-time ledger figures, used for persistence and reporting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    /// Value tendered by second parties for bonds not yet closed.
    pub escrowed: Amount,
    /// Fees retained from closed bonds and not yet withdrawn.
    pub accrued_fees: Amount,
}

impl LedgerSnapshot {
    /// Everything the system holds: `escrowed + accrued_fees`.
    pub fn custodial_balance(&self) -> Amount {
        self.escrowed + self.accrued_fees
    }
}
