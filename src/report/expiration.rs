// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Bucketing of sector expirations into calendar days.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::chain::{Address, SectorRecord};
use crate::{ChainEpoch, StoragePower};

/// Pins a known chain epoch to its calendar date so any other epoch can be
/// mapped to a date by whole-day offsets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalendarAnchor {
    pub epoch: ChainEpoch,
    pub date: NaiveDate,
}

impl Default for CalendarAnchor {
    fn default() -> Self {
        CalendarAnchor {
            epoch: 2_706_480,
            date: NaiveDate::from_ymd_opt(2023, 3, 23).expect("valid anchor date"),
        }
    }
}

impl CalendarAnchor {
    /// The calendar date containing `epoch`.
    ///
    /// The day offset truncates toward zero, so epochs in the day before
    /// the anchor land on the anchor date itself. Anchors predate every
    /// epoch of interest, so the skew is unobservable in practice.
    pub fn date_of(&self, epochs_in_day: ChainEpoch, epoch: ChainEpoch) -> NaiveDate {
        let days = (epoch - self.epoch) / epochs_in_day;
        self.date + Duration::days(days)
    }
}

/// Aggregate quality-adjusted power expiring on one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpirationBucket {
    pub miner: Address,
    pub as_of_date: NaiveDate,
    pub expiration_date: NaiveDate,
    #[serde(with = "crate::json::bigint_string")]
    pub aggregate_power: StoragePower,
}

/// A miner's expiration schedule: one bucket per calendar day on which any
/// of its sectors expire, date ascending.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExpirationReport {
    pub miner: Address,
    pub buckets: Vec<ExpirationBucket>,
}

/// Buckets `(sector, power)` pairs by the calendar day of each sector's
/// expiration epoch, summing power within a day.
pub fn expiration_buckets<'a, I>(
    anchor: &CalendarAnchor,
    epochs_in_day: ChainEpoch,
    miner: &Address,
    as_of_date: NaiveDate,
    sectors: I,
) -> Vec<ExpirationBucket>
where
    I: IntoIterator<Item = (&'a SectorRecord, StoragePower)>,
{
    let mut by_date: BTreeMap<NaiveDate, StoragePower> = BTreeMap::new();
    for (sector, power) in sectors {
        let date = anchor.date_of(epochs_in_day, sector.expiration);
        *by_date.entry(date).or_default() += power;
    }

    by_date
        .into_iter()
        .map(|(expiration_date, aggregate_power)| ExpirationBucket {
            miner: miner.clone(),
            as_of_date,
            expiration_date,
            aggregate_power,
        })
        .collect()
}
