use serde::{Deserialize, Serialize};

use crate::error::BondError;
use crate::types::{Amount, Identity};

/// Default platform fee, in percent of the bond amount.
pub const DEFAULT_FEE_PERCENT: u8 = 10;

/// Default minimum bond amount, in minimal units. With a 10% fee this keeps
/// the fee at 10 units or more.
pub const DEFAULT_MIN_AMOUNT: Amount = 100;

/// Engine-wide settings, fixed for the lifetime of an engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// The only identity allowed to validate, close, and withdraw fees.
    pub arbiter: Identity,
    /// Platform fee in percent (0..=100).
    pub fee_percent: u8,
    /// Smallest bond amount accepted at creation.
    pub min_amount: Amount,
}

impl EngineConfig {
    /// Config with the default fee and minimum.
    pub fn new(arbiter: Identity) -> Self {
        Self {
            arbiter,
            fee_percent: DEFAULT_FEE_PERCENT,
            min_amount: DEFAULT_MIN_AMOUNT,
        }
    }

    pub fn with_fee_percent(mut self, fee_percent: u8) -> Self {
        self.fee_percent = fee_percent;
        self
    }

    pub fn with_min_amount(mut self, min_amount: Amount) -> Self {
        self.min_amount = min_amount;
        self
    }

    pub fn validate(&self) -> Result<(), BondError> {
        if self.arbiter.is_null() {
            return Err(BondError::InvalidConfig("arbiter must not be null".into()));
        }
        if self.fee_percent > 100 {
            return Err(BondError::InvalidConfig(format!(
                "fee_percent must be at most 100, got {}",
                self.fee_percent
            )));
        }
        if self.min_amount == 0 {
            return Err(BondError::InvalidConfig(
                "min_amount must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    pub fn is_arbiter(&self, actor: &Identity) -> bool {
        !actor.is_null() && actor == &self.arbiter
    }
}
