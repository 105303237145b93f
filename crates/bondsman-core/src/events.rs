//! Notifications emitted by the engine.
//!
//! Observers receive these over a broadcast channel; they carry no
//! authority and dropping them never affects bond state.

use serde::{Deserialize, Serialize};

use crate::types::{Amount, BondId, Identity};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondNotification {
    /// A bond was registered.
    Created(BondCreated),
    /// A bond was closed and its payout delivered.
    Closed(BondClosed),
    /// The arbiter withdrew accrued fees.
    FeesWithdrawn { amount: Amount },
}

/// Emitted exactly once per bond, after it is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondCreated {
    pub id: BondId,
    pub name: String,
    pub creator: Identity,
    pub second_party: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondClosed {
    pub id: BondId,
    pub payee: Identity,
    pub payout: Amount,
    pub fee: Amount,
}

impl BondNotification {
    pub fn bond_id(&self) -> Option<BondId> {
        match self {
            Self::Created(c) => Some(c.id),
            Self::Closed(c) => Some(c.id),
            Self::FeesWithdrawn { .. } => None,
        }
    }
}
