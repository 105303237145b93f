use serde::{Deserialize, Serialize};

use crate::types::Amount;

/// How a closed bond's amount is divided between the creator and the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeSplit {
    /// Paid to the creator.
    pub payout: Amount,
    /// Retained as accrued fee.
    pub fee: Amount,
}

impl FeeSplit {
    /// `payout = floor(amount * (100 - fee_percent) / 100)`, `fee` is the
    /// remainder, so `payout + fee == amount` for every input.
    ///
    /// `fee_percent` above 100 is clamped to 100.
    pub fn compute(amount: Amount, fee_percent: u8) -> Self {
        let keep = Amount::from(100 - fee_percent.min(100));
        // amount = 100q + r  =>  floor(amount * keep / 100) = q * keep + floor(r * keep / 100)
        let payout = (amount / 100) * keep + (amount % 100) * keep / 100;
        Self {
            payout,
            fee: amount - payout,
        }
    }

    pub fn total(&self) -> Amount {
        self.payout + self.fee
    }
}
