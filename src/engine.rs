// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The reporting engine: fetches a consistent chain snapshot through
//! [`ChainQuery`] and runs the economics calculators over it.

use chrono::NaiveDate;
use human_repr::HumanCount;
use num_bigint::BigInt;
use tracing::debug;

use crate::chain::{Address, ChainQuery, SectorFilter, TipsetRef};
use crate::econ::{qa_power_for_sector, split_termination_penalty, Policy};
use crate::error::Error;
use crate::report::{
    expiration_buckets, CalendarAnchor, ExpirationReport, MinerSectorsSummary, PenaltyReport,
    SectorWindow,
};

pub struct ReportEngine<Q> {
    chain: Q,
    policy: Policy,
    anchor: CalendarAnchor,
}

impl<Q: ChainQuery> ReportEngine<Q> {
    /// An engine over `chain` with the mainnet policy and anchor.
    pub fn new(chain: Q) -> Self {
        ReportEngine {
            chain,
            policy: Policy::default(),
            anchor: CalendarAnchor::default(),
        }
    }

    /// An engine with a substituted parameter set. Fails if the policy
    /// would divide by zero.
    pub fn with_policy(chain: Q, policy: Policy, anchor: CalendarAnchor) -> Result<Self, Error> {
        policy.validate()?;
        Ok(ReportEngine {
            chain,
            policy,
            anchor,
        })
    }

    pub fn chain(&self) -> &Q {
        &self.chain
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Estimates the termination fine for a miner's sectors matching
    /// `filter`, optionally narrowed to a window of the matched set.
    ///
    /// A window is applied only when it lies entirely inside the matched
    /// set; an out-of-range window falls back to the whole set.
    pub async fn penalty_report(
        &self,
        miner: &Address,
        ts: &TipsetRef,
        filter: SectorFilter,
        window: Option<SectorWindow>,
    ) -> Result<PenaltyReport, Error> {
        let current_epoch = self.chain.tipset_epoch(ts).await?;
        let info = self.chain.miner_info(miner, ts).await?;
        let reward_estimate = self.chain.reward_estimate(ts).await?;
        let power_estimate = self.chain.power_estimate(ts).await?;

        let sectors = self.chain.miner_sectors(miner, filter, ts).await?;
        let total_sector_count = sectors.len();

        let windowed = match window {
            Some(w) if w.offset.saturating_add(w.count) <= sectors.len() => {
                sectors[w.offset..w.offset + w.count].to_vec()
            }
            _ => sectors,
        };

        debug!(
            %miner,
            total = total_sector_count,
            terminated = windowed.len(),
            "computing termination penalty"
        );

        // The split already prices the whole set once; reuse its total
        // instead of computing the set fine a second time.
        let split = split_termination_penalty(
            &self.policy,
            info.sector_size,
            current_epoch,
            &reward_estimate,
            &power_estimate,
            &windowed,
        );
        let fine = split.total_fine.clone();

        let lost_bytes = windowed.len() as u64 * info.sector_size.bytes();
        Ok(PenaltyReport {
            current_epoch,
            miner: miner.clone(),
            total_sector_count,
            terminated_count: windowed.len(),
            lost_power: lost_bytes.human_count_bytes().to_string(),
            fine,
            split,
            sectors: windowed,
        })
    }

    /// Sums pledge and reward projections over all of a miner's sectors.
    /// `include_sectors` attaches the full records to the summary.
    pub async fn sectors_summary(
        &self,
        miner: &Address,
        ts: &TipsetRef,
        include_sectors: bool,
    ) -> Result<MinerSectorsSummary, Error> {
        let height = self.chain.tipset_epoch(ts).await?;
        let all = self.chain.miner_sectors(miner, SectorFilter::All, ts).await?;

        let mut summary = MinerSectorsSummary {
            miner: miner.clone(),
            height,
            sector_count: all.len(),
            all_initial_pledge: BigInt::from(0),
            all_expected_day_reward: BigInt::from(0),
            all_expected_storage_pledge: BigInt::from(0),
            all_replaced_day_reward: BigInt::from(0),
            sectors: None,
        };
        for sector in &all {
            summary.all_initial_pledge += &sector.initial_pledge;
            summary.all_expected_day_reward += &sector.expected_day_reward;
            summary.all_expected_storage_pledge += &sector.expected_storage_pledge;
            summary.all_replaced_day_reward += &sector.replaced_day_reward;
        }
        summary.sectors = include_sectors.then_some(all);
        Ok(summary)
    }

    /// Buckets a miner's live sectors' quality-adjusted power by
    /// expiration date.
    pub async fn expiration_report(
        &self,
        miner: &Address,
        ts: &TipsetRef,
        as_of_date: NaiveDate,
    ) -> Result<ExpirationReport, Error> {
        let info = self.chain.miner_info(miner, ts).await?;
        let sectors = self
            .chain
            .miner_sectors(miner, SectorFilter::Live, ts)
            .await?;

        let buckets = expiration_buckets(
            &self.anchor,
            self.policy.epochs_in_day,
            miner,
            as_of_date,
            sectors.iter().map(|sector| {
                let power: BigInt = qa_power_for_sector(&self.policy, info.sector_size, sector);
                (sector, power)
            }),
        );

        Ok(ExpirationReport {
            miner: miner.clone(),
            buckets,
        })
    }
}
