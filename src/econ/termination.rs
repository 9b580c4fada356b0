// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::cmp;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Zero;

use crate::chain::SectorRecord;
use crate::math::PRECISION;
use crate::smooth::{self, FilterEstimate};
use crate::{ChainEpoch, Policy, SectorSize, StoragePower, TokenAmount};

use super::quality::qa_power_for_sector;

/// The projected reward a sector would earn over some period, "BR(t)".
///
/// BR(t) = ProjectedRewardFraction(t) * SectorQualityAdjustedPower, where
/// the fraction is the integral of estimated reward over estimated total
/// power across the projection period. A zero network power estimate falls
/// back to the reward estimate's instantaneous value instead of dividing
/// by zero. The result is floored at zero.
pub fn expected_reward_for_power(
    reward_estimate: &FilterEstimate,
    network_qa_power_estimate: &FilterEstimate,
    qa_sector_power: &StoragePower,
    projection_duration: ChainEpoch,
) -> TokenAmount {
    let network_qa_power_smoothed = network_qa_power_estimate.estimate();

    if network_qa_power_smoothed.is_zero() {
        return reward_estimate.estimate();
    }

    let expected_reward_for_proving_period = smooth::extrapolated_cum_sum_of_ratio(
        projection_duration,
        0,
        reward_estimate,
        network_qa_power_estimate,
    );
    let br128 = qa_sector_power * expected_reward_for_proving_period; // Q.0 * Q.128 => Q.128
    cmp::max(br128 >> PRECISION, BigInt::zero())
}

/// The lower bound of the termination penalty, "SP(t)": a short projection
/// of the sector's expected reward.
pub fn pledge_penalty_for_termination_lower_bound(
    policy: &Policy,
    reward_estimate: &FilterEstimate,
    network_qa_power_estimate: &FilterEstimate,
    qa_sector_power: &StoragePower,
) -> TokenAmount {
    expected_reward_for_power(
        reward_estimate,
        network_qa_power_estimate,
        qa_sector_power,
        policy.termination_penalty_lower_bound_projection_period,
    )
}

/// Penalty to locked pledge collateral for terminating a sector before its
/// scheduled expiry.
///
/// max(SP(t), BR(StartEpoch, 20d) +
///            BR(StartEpoch, 1d) * terminationRewardFactor * min(SectorAgeInDays, 140))
///
/// `sector_age` is the time between activation and termination. If the
/// sector replaced an earlier one, the replaced sector's age earns reward
/// credit too, capped so the combined age never exceeds the lifetime cap.
#[allow(clippy::too_many_arguments)]
pub fn pledge_penalty_for_termination(
    policy: &Policy,
    day_reward: &TokenAmount,
    sector_age: ChainEpoch,
    twenty_day_reward_at_activation: &TokenAmount,
    network_qa_power_estimate: &FilterEstimate,
    qa_sector_power: &StoragePower,
    reward_estimate: &FilterEstimate,
    replaced_day_reward: &TokenAmount,
    replaced_sector_age: ChainEpoch,
) -> TokenAmount {
    let lifetime_cap = policy.lifetime_cap_epochs();
    let capped_sector_age = cmp::min(sector_age, lifetime_cap);

    let mut expected_reward: TokenAmount = day_reward * capped_sector_age;

    let relevant_replaced_age = cmp::min(replaced_sector_age, lifetime_cap - capped_sector_age);
    expected_reward += replaced_day_reward * relevant_replaced_age;

    let penalized_reward = expected_reward * &policy.termination_reward_factor_num;

    cmp::max(
        pledge_penalty_for_termination_lower_bound(
            policy,
            reward_estimate,
            network_qa_power_estimate,
            qa_sector_power,
        ),
        twenty_day_reward_at_activation
            + penalized_reward.div_floor(
                &(BigInt::from(policy.epochs_in_day) * &policy.termination_reward_factor_denom),
            ),
    )
}

/// The total termination fine for a set of sectors at `current_epoch`,
/// summed in input order.
pub fn termination_penalty<'a, I>(
    policy: &Policy,
    sector_size: SectorSize,
    current_epoch: ChainEpoch,
    reward_estimate: &FilterEstimate,
    network_qa_power_estimate: &FilterEstimate,
    sectors: I,
) -> TokenAmount
where
    I: IntoIterator<Item = &'a SectorRecord>,
{
    let mut total_fee = TokenAmount::zero();
    for sector in sectors {
        let sector_power = qa_power_for_sector(policy, sector_size, sector);
        let fee = pledge_penalty_for_termination(
            policy,
            &sector.expected_day_reward,
            current_epoch - sector.activation,
            &sector.expected_storage_pledge,
            network_qa_power_estimate,
            &sector_power,
            reward_estimate,
            &sector.replaced_day_reward,
            sector.replaced_sector_age.unwrap_or(0),
        );
        total_fee += fee;
    }
    total_fee
}

/// Termination fines for a sector set split between committed-capacity and
/// deal-carrying sectors.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TerminationSplit {
    #[serde(rename = "CCCount")]
    pub cc_count: usize,
    #[serde(rename = "DCCount")]
    pub dc_count: usize,
    #[serde(with = "crate::json::bigint_string")]
    pub total_fine: TokenAmount,
    #[serde(rename = "CCFine", with = "crate::json::bigint_string")]
    pub cc_fine: TokenAmount,
    #[serde(rename = "DCFine", with = "crate::json::bigint_string")]
    pub dc_fine: TokenAmount,
}

/// Splits the whole-set termination fine between committed-capacity and
/// deal-carrying sectors.
///
/// The whole-set fine is computed once; the fine of whichever subset is
/// the minority by count is computed independently, and the majority
/// subset receives the difference. The two subset fines therefore always
/// sum exactly to the whole-set fine, which per-subset recomputation would
/// not guarantee.
pub fn split_termination_penalty(
    policy: &Policy,
    sector_size: SectorSize,
    current_epoch: ChainEpoch,
    reward_estimate: &FilterEstimate,
    network_qa_power_estimate: &FilterEstimate,
    sectors: &[SectorRecord],
) -> TerminationSplit {
    let fine = |subset: &[&SectorRecord]| {
        termination_penalty(
            policy,
            sector_size,
            current_epoch,
            reward_estimate,
            network_qa_power_estimate,
            subset.iter().copied(),
        )
    };

    let (cc, dc): (Vec<&SectorRecord>, Vec<&SectorRecord>) = sectors
        .iter()
        .partition(|sector| sector.is_committed_capacity());

    let total_fine = termination_penalty(
        policy,
        sector_size,
        current_epoch,
        reward_estimate,
        network_qa_power_estimate,
        sectors,
    );

    let (cc_fine, dc_fine) = if dc.is_empty() {
        (total_fine.clone(), TokenAmount::zero())
    } else if cc.is_empty() {
        (TokenAmount::zero(), total_fine.clone())
    } else if dc.len() > cc.len() {
        let cc_fine = fine(&cc);
        let dc_fine = &total_fine - &cc_fine;
        (cc_fine, dc_fine)
    } else {
        let dc_fine = fine(&dc);
        let cc_fine = &total_fine - &dc_fine;
        (cc_fine, dc_fine)
    };

    TerminationSplit {
        cc_count: cc.len(),
        dc_count: dc.len(),
        total_fine,
        cc_fine,
        dc_fine,
    }
}
