use crate::types::{Amount, BondId, Party};

/// Bond lifecycle and validation errors.
///
/// Every rejected precondition maps to its own variant so callers can tell
/// causes apart; none of them leave partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BondError {
    #[error("bond not found: {0}")]
    NotFound(BondId),

    #[error("{actor} is not authorized to {action}")]
    Unauthorized { actor: String, action: &'static str },

    #[error("invalid identity: {0:?}")]
    InvalidIdentity(String),

    #[error("bond name must not be empty")]
    InvalidName,

    #[error("amount {amount} is below the minimum of {minimum}")]
    AmountBelowMinimum { amount: Amount, minimum: Amount },

    #[error("invalid second party: {0}")]
    InvalidSecondParty(String),

    #[error("bond is already signed")]
    AlreadySigned,

    #[error("bond is not signed")]
    NotSigned,

    #[error("bond is already validated")]
    AlreadyValidated,

    #[error("bond is not validated")]
    NotValidated,

    #[error("{0} has already confirmed")]
    AlreadyConfirmed(Party),

    #[error("{0} has not confirmed yet")]
    ConfirmationMissing(Party),

    #[error("bond is already completed")]
    AlreadyCompleted,

    #[error("wrong amount tendered: expected {expected}, got {tendered}")]
    WrongAmount { expected: Amount, tendered: Amount },

    #[error("first party confirmation must not carry value (got {0})")]
    UnexpectedValue(Amount),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("bond identifiers exhausted")]
    IdsExhausted,
}

impl BondError {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::Unauthorized { .. } => "Unauthorized",
            Self::InvalidIdentity(_) => "InvalidIdentity",
            Self::InvalidName => "InvalidName",
            Self::AmountBelowMinimum { .. } => "AmountBelowMinimum",
            Self::InvalidSecondParty(_) => "InvalidSecondParty",
            Self::AlreadySigned => "AlreadySigned",
            Self::NotSigned => "NotSigned",
            Self::AlreadyValidated => "AlreadyValidated",
            Self::NotValidated => "NotValidated",
            Self::AlreadyConfirmed(_) => "AlreadyConfirmed",
            Self::ConfirmationMissing(_) => "ConfirmationMissing",
            Self::AlreadyCompleted => "AlreadyCompleted",
            Self::WrongAmount { .. } => "WrongAmount",
            Self::UnexpectedValue(_) => "UnexpectedValue",
            Self::InvalidConfig(_) => "InvalidConfig",
            Self::IdsExhausted => "IdsExhausted",
        }
    }

    pub fn unauthorized(actor: impl std::fmt::Display, action: &'static str) -> Self {
        Self::Unauthorized {
            actor: actor.to_string(),
            action,
        }
    }
}
