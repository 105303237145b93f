//! Bondsman Fee Ledger
//!
//! Escrow custody, fee accrual, and the value-transfer rails that move funds
//! out of custody (bond payouts and fee withdrawals).

pub mod adapters;
pub mod error;
pub mod fee_ledger;
pub mod traits;
pub mod types;

pub use adapters::InternalRail;
pub use error::LedgerError;
pub use fee_ledger::{FeeLedger, Settlement, Withdrawal};
pub use traits::{ITransfer, SnapshotSink};
pub use types::{LedgerSnapshot, TransferId, TransferMemo, TransferReceipt};
