use bondsman_core::Amount;

/// Ledger and value-transfer errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{actor} is not authorized to {action}")]
    Unauthorized { actor: String, action: &'static str },

    #[error("transfer of {amount} to {to} rejected: {reason}")]
    TransferRejected {
        to: String,
        amount: Amount,
        reason: String,
    },

    #[error("insufficient custody: available {available}, required {required}")]
    InsufficientCustody { available: Amount, required: Amount },

    #[error("journal write failed: {0}")]
    Journal(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl LedgerError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "Unauthorized",
            Self::TransferRejected { .. } => "TransferRejected",
            Self::InsufficientCustody { .. } => "InsufficientCustody",
            Self::Journal(_) => "Journal",
            Self::Internal(_) => "Internal",
        }
    }
}
