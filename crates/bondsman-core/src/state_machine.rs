use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BondError;
use crate::types::{Identity, Party};

/// The two confirmation slots of a bond.
///
/// Slot 0 belongs to the creator, slot 1 to the second party. A slot, once
/// set, is never cleared. The slots are independent: either party may
/// confirm first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmations {
    pub first_party: Option<Identity>,
    pub second_party: Option<Identity>,
}

impl Confirmations {
    pub fn get(&self, party: Party) -> Option<&Identity> {
        match party {
            Party::First => self.first_party.as_ref(),
            Party::Second => self.second_party.as_ref(),
        }
    }

    pub fn is_set(&self, party: Party) -> bool {
        self.get(party).is_some()
    }

    /// Number of slots set (0, 1 or 2).
    pub fn count(&self) -> usize {
        usize::from(self.first_party.is_some()) + usize::from(self.second_party.is_some())
    }

    pub fn is_complete(&self) -> bool {
        self.count() == 2
    }

    /// The first unset slot, if any.
    pub fn missing(&self) -> Option<Party> {
        if self.first_party.is_none() {
            Some(Party::First)
        } else if self.second_party.is_none() {
            Some(Party::Second)
        } else {
            None
        }
    }

    fn with(&self, party: Party, by: Identity) -> Self {
        let mut next = self.clone();
        match party {
            Party::First => next.first_party = Some(by),
            Party::Second => next.second_party = Some(by),
        }
        next
    }
}

/// Lifecycle state of a bond.
///
/// Confirmation slots only exist once the bond is validated, so states such
/// as "completed without validation" cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BondState {
    /// Registered by the creator; awaiting the second party's signature.
    Created,
    /// Signed by the second party; awaiting arbiter validation.
    Signed,
    /// Validated by the arbiter; collecting confirmations.
    Validated(Confirmations),
    /// Closed by the arbiter and paid out. Final state.
    Completed(Confirmations),
}

impl BondState {
    pub fn phase(&self) -> BondPhase {
        match self {
            Self::Created => BondPhase::Created,
            Self::Signed => BondPhase::Signed,
            Self::Validated(c) => match c.count() {
                0 => BondPhase::Validated,
                1 => BondPhase::PartiallyConfirmed,
                _ => BondPhase::FullyConfirmed,
            },
            Self::Completed(_) => BondPhase::Completed,
        }
    }

    pub fn is_signed(&self) -> bool {
        !matches!(self, Self::Created)
    }

    pub fn is_validated(&self) -> bool {
        matches!(self, Self::Validated(_) | Self::Completed(_))
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }

    /// Current confirmation slots (empty before validation).
    pub fn confirmations(&self) -> Confirmations {
        match self {
            Self::Validated(c) | Self::Completed(c) => c.clone(),
            _ => Confirmations::default(),
        }
    }
}

/// The six externally visible phases of a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BondPhase {
    Created,
    Signed,
    Validated,
    PartiallyConfirmed,
    FullyConfirmed,
    Completed,
}

impl fmt::Display for BondPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => write!(f, "Created"),
            Self::Signed => write!(f, "Signed"),
            Self::Validated => write!(f, "Validated"),
            Self::PartiallyConfirmed => write!(f, "PartiallyConfirmed"),
            Self::FullyConfirmed => write!(f, "FullyConfirmed"),
            Self::Completed => write!(f, "Completed"),
        }
    }
}

/// Events that drive bond state transitions.
///
/// Actor authorization is checked by the registry before an event reaches
/// the state machine; the state machine only enforces ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BondEvent {
    /// The second party signed.
    Sign,
    /// The arbiter validated.
    Validate,
    /// A party confirmed their side of the exchange.
    Confirm { party: Party, by: Identity },
    /// The arbiter closed the bond.
    Close,
}

/// Bond lifecycle transitions.
///
/// Valid transitions:
/// - Created → Signed (Sign)
/// - Signed → Validated (Validate)
/// - Validated → Validated with one more slot set (Confirm)
/// - Validated with both slots set → Completed (Close)
pub struct BondStateMachine;

impl BondStateMachine {
    /// Attempt a transition. Returns the new state, or the specific reason
    /// the event is not allowed in `current`.
    pub fn transition(current: &BondState, event: BondEvent) -> Result<BondState, BondError> {
        let next = match (current, &event) {
            (BondState::Created, BondEvent::Sign) => BondState::Signed,
            (_, BondEvent::Sign) => return Err(BondError::AlreadySigned),

            (BondState::Created, BondEvent::Validate) => return Err(BondError::NotSigned),
            (BondState::Signed, BondEvent::Validate) => {
                BondState::Validated(Confirmations::default())
            }
            (_, BondEvent::Validate) => return Err(BondError::AlreadyValidated),

            (BondState::Created, _) => return Err(BondError::NotSigned),
            (BondState::Signed, _) => return Err(BondError::NotValidated),
            (BondState::Completed(_), _) => return Err(BondError::AlreadyCompleted),

            (BondState::Validated(c), BondEvent::Confirm { party, by }) => {
                if c.is_set(*party) {
                    return Err(BondError::AlreadyConfirmed(*party));
                }
                BondState::Validated(c.with(*party, by.clone()))
            }

            (BondState::Validated(c), BondEvent::Close) => match c.missing() {
                Some(party) => return Err(BondError::ConfirmationMissing(party)),
                None => BondState::Completed(c.clone()),
            },
        };

        tracing::debug!(
            from = %current.phase(),
            to = %next.phase(),
            event = ?event,
            "bond state transition"
        );

        Ok(next)
    }

    /// Check if a transition is valid without performing it.
    pub fn can_transition(current: &BondState, event: BondEvent) -> bool {
        Self::transition(current, event).is_ok()
    }
}
