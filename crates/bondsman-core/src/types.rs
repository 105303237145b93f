use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::BondError;

/// Value in minimal units (cents, satoshis, wei, ...).
///
/// Bonds are single-currency, so a bare integer is enough; all fee
/// arithmetic is integer-only.
pub type Amount = u128;

/// Opaque, comparable identity of a caller (creator, second party, arbiter).
///
/// The empty string is the null identity and is never a valid party.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identity(String);

impl Identity {
    /// Create an identity, rejecting the null (empty or blank) value.
    pub fn new(value: impl Into<String>) -> Result<Self, BondError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(BondError::InvalidIdentity(value));
        }
        Ok(Self(value))
    }

    /// The null identity. Never accepted as a party or arbiter.
    pub fn null() -> Self {
        Self(String::new())
    }

    /// Whether this is the null identity.
    pub fn is_null(&self) -> bool {
        self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "<null>")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

impl From<&str> for Identity {
    /// Infallible conversion; a blank string yields the null identity.
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Bond identifier, allocated from a monotonically increasing counter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct BondId(pub u64);

impl BondId {
    /// The first identifier handed out by a fresh registry.
    pub const FIRST: BondId = BondId(1);

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The identifier following this one, or `None` past `u64::MAX`.
    pub fn next(&self) -> Option<BondId> {
        self.0.checked_add(1).map(BondId)
    }

    /// Big-endian key bytes, so stored records sort by id.
    pub fn to_key(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }
}

impl fmt::Display for BondId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The two ordered positions of a bond.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Party {
    /// Position 0: the creator.
    First,
    /// Position 1: the counterpart who tenders the bond amount.
    Second,
}

impl Party {
    pub fn index(&self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => write!(f, "first party"),
            Self::Second => write!(f, "second party"),
        }
    }
}
