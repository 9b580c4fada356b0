// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use num_bigint::BigInt;
use num_integer::Integer;

use crate::chain::SectorRecord;
use crate::math::SECTOR_QUALITY_PRECISION;
use crate::{ChainEpoch, DealWeight, Policy, SectorQuality, SectorSize, StoragePower};

/// The quality multiplier for a sector's size, committed duration and deal
/// weights, Q.20.
///
/// Callers guarantee `deal_weight + verified_weight` does not exceed the
/// sector's space-time; upstream chain state is assumed validated.
pub fn quality_for_weight(
    policy: &Policy,
    size: SectorSize,
    duration: ChainEpoch,
    deal_weight: &DealWeight,
    verified_weight: &DealWeight,
) -> SectorQuality {
    let sector_space_time = BigInt::from(size.bytes()) * BigInt::from(duration);
    let total_deal_space_time = deal_weight + verified_weight;

    let weighted_base_space_time =
        (&sector_space_time - &total_deal_space_time) * &policy.quality_base_multiplier;
    let weighted_deal_space_time = deal_weight * &policy.deal_weight_multiplier;
    let weighted_verified_space_time = verified_weight * &policy.verified_deal_weight_multiplier;
    let weighted_sum_space_time =
        weighted_base_space_time + weighted_deal_space_time + weighted_verified_space_time;
    let scaled_up_weighted_sum_space_time: BigInt =
        weighted_sum_space_time << SECTOR_QUALITY_PRECISION;

    // Two sequential floored divisions; folding them into one changes the
    // rounding and breaks parity with on-chain figures.
    scaled_up_weighted_sum_space_time
        .div_floor(&sector_space_time)
        .div_floor(&policy.quality_base_multiplier)
}

/// The quality-adjusted power for a sector size, duration and deal
/// weights.
pub fn qa_power_for_weight(
    policy: &Policy,
    size: SectorSize,
    duration: ChainEpoch,
    deal_weight: &DealWeight,
    verified_weight: &DealWeight,
) -> StoragePower {
    let quality = quality_for_weight(policy, size, duration, deal_weight, verified_weight);
    (BigInt::from(size.bytes()) * quality) >> SECTOR_QUALITY_PRECISION
}

/// The quality-adjusted power for a sector.
pub fn qa_power_for_sector(
    policy: &Policy,
    size: SectorSize,
    sector: &SectorRecord,
) -> StoragePower {
    qa_power_for_weight(
        policy,
        size,
        sector.duration(),
        &sector.deal_weight,
        &sector.verified_deal_weight,
    )
}
