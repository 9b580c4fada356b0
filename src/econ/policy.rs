// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use num_bigint::BigInt;
use num_traits::Zero;

use crate::error::Error;
use crate::ChainEpoch;

/// Epochs in a calendar day at the mainnet block time.
pub const EPOCHS_IN_DAY: ChainEpoch = 2880;

/// Maximum number of days of expected reward a terminated sector is
/// penalized for.
pub const TERMINATION_LIFETIME_CAP: ChainEpoch = 140;

/// Protocol parameters consumed by the calculators.
///
/// These are injected rather than read from globals so an alternate
/// parameter set (e.g. a different protocol version under test) can be
/// substituted without recompilation. [`Policy::default`] carries the
/// mainnet values.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Policy {
    /// Epochs per calendar day.
    pub epochs_in_day: ChainEpoch,

    /// Termination penalty lifetime cap, in days.
    pub termination_lifetime_cap: ChainEpoch,

    /// Fraction of expected reward penalized on termination, kept as an
    /// exact rational: multiply by the numerator, divide by the
    /// denominator last.
    pub termination_reward_factor_num: BigInt,
    pub termination_reward_factor_denom: BigInt,

    /// Projection period of the termination penalty lower bound, in
    /// epochs (3.5 days on mainnet).
    pub termination_penalty_lower_bound_projection_period: ChainEpoch,

    /// Quality multiplier of non-deal space-time.
    pub quality_base_multiplier: BigInt,
    /// Quality multiplier of unverified deal space-time.
    pub deal_weight_multiplier: BigInt,
    /// Quality multiplier of verified deal space-time.
    pub verified_deal_weight_multiplier: BigInt,
}

impl Default for Policy {
    fn default() -> Self {
        Policy {
            epochs_in_day: EPOCHS_IN_DAY,
            termination_lifetime_cap: TERMINATION_LIFETIME_CAP,
            termination_reward_factor_num: BigInt::from(1),
            termination_reward_factor_denom: BigInt::from(2),
            termination_penalty_lower_bound_projection_period: (EPOCHS_IN_DAY * 35) / 10,
            quality_base_multiplier: BigInt::from(1),
            deal_weight_multiplier: BigInt::from(10),
            verified_deal_weight_multiplier: BigInt::from(100),
        }
    }
}

impl Policy {
    /// The lifetime cap expressed in epochs.
    pub fn lifetime_cap_epochs(&self) -> ChainEpoch {
        self.termination_lifetime_cap * self.epochs_in_day
    }

    /// Rejects parameter sets that would put a zero into a divisor
    /// position. Checked once at engine construction; the calculators
    /// themselves assume a valid policy.
    pub fn validate(&self) -> Result<(), Error> {
        if self.epochs_in_day == 0
            || self.quality_base_multiplier.is_zero()
            || self.termination_reward_factor_denom.is_zero()
        {
            return Err(Error::DivisionByZero);
        }
        Ok(())
    }
}
