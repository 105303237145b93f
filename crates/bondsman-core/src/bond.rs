use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::BondError;
use crate::state_machine::{BondPhase, BondState, Confirmations};
use crate::types::{Amount, BondId, Identity, Party};

/// A recorded agreement between a creator and a second party.
///
/// `id`, `name`, `amount` and both parties are fixed at creation; only
/// `state` changes afterwards, and only through the state machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bond {
    pub id: BondId,
    pub name: String,
    /// Value the second party must tender.
    pub amount: Amount,
    /// Position 0.
    pub creator: Identity,
    /// Position 1.
    pub second_party: Identity,
    pub state: BondState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Bond {
    /// Check creation preconditions without allocating an id.
    pub fn check_terms(
        config: &EngineConfig,
        creator: &Identity,
        name: &str,
        amount: Amount,
        second_party: &Identity,
    ) -> Result<(), BondError> {
        if creator.is_null() {
            return Err(BondError::InvalidIdentity(creator.as_str().to_string()));
        }
        if name.trim().is_empty() {
            return Err(BondError::InvalidName);
        }
        if amount < config.min_amount {
            return Err(BondError::AmountBelowMinimum {
                amount,
                minimum: config.min_amount,
            });
        }
        if second_party.is_null() {
            return Err(BondError::InvalidSecondParty(
                "second party must not be the null identity".into(),
            ));
        }
        if second_party == creator {
            return Err(BondError::InvalidSecondParty(
                "second party must differ from the creator".into(),
            ));
        }
        Ok(())
    }

    /// Build a bond in the `Created` state. Terms must already be checked.
    pub fn new(
        id: BondId,
        name: String,
        amount: Amount,
        creator: Identity,
        second_party: Identity,
    ) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            amount,
            creator,
            second_party,
            state: BondState::Created,
            created_at: now,
            updated_at: now,
        }
    }

    /// Copy of this bond moved to `state`, stamped with the current time.
    pub fn advanced(&self, state: BondState) -> Bond {
        Bond {
            state,
            updated_at: Utc::now(),
            ..self.clone()
        }
    }

    /// Which position `actor` holds in this bond, if any.
    pub fn party_of(&self, actor: &Identity) -> Option<Party> {
        if actor == &self.creator {
            Some(Party::First)
        } else if actor == &self.second_party {
            Some(Party::Second)
        } else {
            None
        }
    }

    pub fn party(&self, party: Party) -> &Identity {
        match party {
            Party::First => &self.creator,
            Party::Second => &self.second_party,
        }
    }

    pub fn view(&self) -> BondView {
        BondView {
            id: self.id,
            name: self.name.clone(),
            amount: self.amount,
            creator: self.creator.clone(),
            second_party: self.second_party.clone(),
            signed: self.state.is_signed(),
            validated: self.state.is_validated(),
            completed: self.state.is_completed(),
            phase: self.state.phase(),
            confirmations: self.state.confirmations(),
        }
    }
}

/// Read-only projection of a bond.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BondView {
    pub id: BondId,
    pub name: String,
    pub amount: Amount,
    pub creator: Identity,
    pub second_party: Identity,
    pub signed: bool,
    pub validated: bool,
    pub completed: bool,
    pub phase: BondPhase,
    pub confirmations: Confirmations,
}
