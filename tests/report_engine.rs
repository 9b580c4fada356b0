// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use num_bigint::BigInt;
use num_traits::Zero;
use sector_report::{
    network_expiration_report, Address, BatchConfig, ChainEpoch, ChainQuery, Error, FilterEstimate,
    MinerInfo, Policy, ReportEngine, SectorFilter, SectorRecord, SectorSize, SectorWindow,
    TipsetRef,
};

struct StubChain {
    epoch: ChainEpoch,
    miners: HashMap<Address, Vec<SectorRecord>>,
    /// Miners whose state queries fail, as an unreachable actor would.
    broken: Vec<Address>,
}

impl StubChain {
    fn sectors_of(&self, miner: &Address) -> Result<&Vec<SectorRecord>, Error> {
        if self.broken.contains(miner) {
            return Err(Error::ActorNotFound(miner.clone()));
        }
        self.miners
            .get(miner)
            .ok_or_else(|| Error::ActorNotFound(miner.clone()))
    }
}

#[async_trait]
impl ChainQuery for StubChain {
    async fn tipset_epoch(&self, _ts: &TipsetRef) -> Result<ChainEpoch, Error> {
        Ok(self.epoch)
    }

    async fn list_miners(&self, _ts: &TipsetRef) -> Result<Vec<Address>, Error> {
        let mut miners: Vec<Address> = self.miners.keys().cloned().collect();
        miners.extend(self.broken.iter().cloned());
        miners.sort();
        Ok(miners)
    }

    async fn miner_info(&self, miner: &Address, _ts: &TipsetRef) -> Result<MinerInfo, Error> {
        self.sectors_of(miner)?;
        Ok(MinerInfo {
            sector_size: SectorSize::_32GiB,
        })
    }

    async fn miner_sectors(
        &self,
        miner: &Address,
        filter: SectorFilter,
        _ts: &TipsetRef,
    ) -> Result<Vec<SectorRecord>, Error> {
        let sectors = self.sectors_of(miner)?;
        Ok(match filter {
            SectorFilter::Faulty => Vec::new(),
            SectorFilter::Live | SectorFilter::All => sectors.clone(),
        })
    }

    async fn reward_estimate(&self, _ts: &TipsetRef) -> Result<FilterEstimate, Error> {
        Ok(FilterEstimate::new(
            BigInt::from(50) * BigInt::from(10u64).pow(18),
            BigInt::zero(),
        ))
    }

    async fn power_estimate(&self, _ts: &TipsetRef) -> Result<FilterEstimate, Error> {
        Ok(FilterEstimate::new(
            BigInt::from(600) * BigInt::from(10u64).pow(18),
            BigInt::zero(),
        ))
    }
}

fn sector(number: u64, deal_ids: Vec<u64>, expiration: ChainEpoch) -> SectorRecord {
    SectorRecord {
        sector_number: number,
        deal_ids,
        activation: 100,
        expiration,
        deal_weight: BigInt::zero(),
        verified_deal_weight: BigInt::zero(),
        initial_pledge: BigInt::from(1_000_000),
        expected_day_reward: BigInt::from(5_000),
        expected_storage_pledge: BigInt::from(100_000),
        replaced_sector_age: None,
        replaced_day_reward: BigInt::zero(),
    }
}

fn addr(s: &str) -> Address {
    s.parse().unwrap()
}

fn stub_with_miner(sectors: Vec<SectorRecord>) -> StubChain {
    StubChain {
        epoch: 3_000_000,
        miners: HashMap::from([(addr("f01000"), sectors)]),
        broken: Vec::new(),
    }
}

#[tokio::test]
async fn penalty_report_windows_the_sector_list() {
    let sectors: Vec<SectorRecord> = (1..=5)
        .map(|i| sector(i, vec![], 3_500_000 + i as i64))
        .collect();
    let engine = ReportEngine::new(stub_with_miner(sectors));

    let report = engine
        .penalty_report(
            &addr("f01000"),
            &TipsetRef::Head,
            SectorFilter::Live,
            Some(SectorWindow { offset: 1, count: 2 }),
        )
        .await
        .unwrap();

    assert_eq!(5, report.total_sector_count);
    assert_eq!(2, report.terminated_count);
    assert_eq!(
        vec![2, 3],
        report
            .sectors
            .iter()
            .map(|s| s.sector_number)
            .collect::<Vec<_>>()
    );
    // 2 x 32 GiB
    assert_eq!("64 GiB", report.lost_power);
    assert!(report.fine > BigInt::zero());
}

#[tokio::test]
async fn out_of_range_window_falls_back_to_the_whole_set() {
    let sectors: Vec<SectorRecord> = (1..=3)
        .map(|i| sector(i, vec![], 3_500_000))
        .collect();
    let engine = ReportEngine::new(stub_with_miner(sectors));

    let report = engine
        .penalty_report(
            &addr("f01000"),
            &TipsetRef::Head,
            SectorFilter::Live,
            Some(SectorWindow { offset: 2, count: 5 }),
        )
        .await
        .unwrap();

    assert_eq!(3, report.terminated_count);
}

#[tokio::test]
async fn penalty_split_is_consistent_with_the_total() {
    let sectors = vec![
        sector(1, vec![], 3_500_000),
        sector(2, vec![42], 3_500_000),
        sector(3, vec![], 3_600_000),
    ];
    let engine = ReportEngine::new(stub_with_miner(sectors.clone()));

    let report = engine
        .penalty_report(&addr("f01000"), &TipsetRef::Head, SectorFilter::Live, None)
        .await
        .unwrap();

    // the reported fine must equal the whole-set penalty computed
    // independently with the stub's estimates
    let whole_set_fine = sector_report::econ::termination_penalty(
        &Policy::default(),
        SectorSize::_32GiB,
        3_000_000,
        &FilterEstimate::new(
            BigInt::from(50) * BigInt::from(10u64).pow(18),
            BigInt::zero(),
        ),
        &FilterEstimate::new(
            BigInt::from(600) * BigInt::from(10u64).pow(18),
            BigInt::zero(),
        ),
        &sectors,
    );
    assert_eq!(whole_set_fine, report.fine);
    assert_eq!(report.fine, report.split.total_fine);
    assert_eq!(
        report.split.total_fine,
        &report.split.cc_fine + &report.split.dc_fine
    );
    assert_eq!(2, report.split.cc_count);
    assert_eq!(1, report.split.dc_count);
}

#[tokio::test]
async fn summary_sums_pledges_and_reward_projections() {
    let sectors = vec![
        sector(1, vec![], 3_500_000),
        sector(2, vec![], 3_500_000),
        sector(3, vec![], 3_600_000),
    ];
    let engine = ReportEngine::new(stub_with_miner(sectors));

    let summary = engine
        .sectors_summary(&addr("f01000"), &TipsetRef::Head, false)
        .await
        .unwrap();

    assert_eq!(3_000_000, summary.height);
    assert_eq!(3, summary.sector_count);
    assert_eq!(BigInt::from(3_000_000), summary.all_initial_pledge);
    assert_eq!(BigInt::from(15_000), summary.all_expected_day_reward);
    assert_eq!(BigInt::from(300_000), summary.all_expected_storage_pledge);
    assert_eq!(BigInt::zero(), summary.all_replaced_day_reward);
    assert!(summary.sectors.is_none());

    let with_sectors = engine
        .sectors_summary(&addr("f01000"), &TipsetRef::Head, true)
        .await
        .unwrap();
    assert_eq!(3, with_sectors.sectors.unwrap().len());
}

#[tokio::test]
async fn expiration_report_buckets_by_day_with_raw_power_for_cc() {
    // Two sectors one epoch apart in the same day, one a day later.
    let base = 2_706_480 + 300 * 2880;
    let sectors = vec![
        sector(1, vec![], base),
        sector(2, vec![], base + 1),
        sector(3, vec![], base + 2880),
    ];
    let engine = ReportEngine::new(stub_with_miner(sectors));

    let as_of = NaiveDate::from_ymd_opt(2024, 1, 17).unwrap();
    let report = engine
        .expiration_report(&addr("f01000"), &TipsetRef::Head, as_of)
        .await
        .unwrap();

    assert_eq!(2, report.buckets.len());
    assert!(report.buckets[0].expiration_date < report.buckets[1].expiration_date);
    // CC sectors contribute raw byte power
    assert_eq!(
        BigInt::from(2u64 * (32u64 << 30)),
        report.buckets[0].aggregate_power
    );
    assert_eq!(as_of, report.buckets[0].as_of_date);
}

#[tokio::test]
async fn batch_skips_broken_miners_and_keeps_the_rest() {
    let chain = StubChain {
        epoch: 3_000_000,
        miners: HashMap::from([
            (addr("f01000"), vec![sector(1, vec![], 3_500_000)]),
            (addr("f01001"), vec![sector(1, vec![], 3_600_000)]),
        ]),
        broken: vec![addr("f01002")],
    };
    let engine = Arc::new(ReportEngine::new(chain));

    let outcome = network_expiration_report(&engine, &BatchConfig::default(), &TipsetRef::Head)
        .await
        .unwrap();

    assert_eq!(2, outcome.reports.len());
    assert_eq!(1, outcome.skipped);
}

#[test]
fn zero_divisor_policy_is_rejected_at_construction() {
    let mut policy = Policy::default();
    policy.epochs_in_day = 0;
    let result = ReportEngine::with_policy(
        stub_with_miner(Vec::new()),
        policy,
        sector_report::CalendarAnchor::default(),
    );
    assert!(matches!(result, Err(Error::DivisionByZero)));
}
