use bondsman_core::BondError;
use bondsman_ledger::LedgerError;

use crate::store::StoreError;

/// Errors returned by registry and engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error(transparent)]
    Bond(#[from] BondError),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl RegistryError {
    /// Name of the underlying variant, e.g. `"AlreadyCompleted"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bond(e) => e.kind(),
            Self::Ledger(e) => e.kind(),
            Self::Storage(_) => "Storage",
        }
    }

    /// The lifecycle error, if this is one.
    pub fn as_bond(&self) -> Option<&BondError> {
        match self {
            Self::Bond(e) => Some(e),
            _ => None,
        }
    }
}
