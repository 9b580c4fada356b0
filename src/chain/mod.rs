// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! The chain-query collaborator boundary.
//!
//! Reports are computed against already-fetched state: everything the
//! engine consumes arrives through [`ChainQuery`], keyed by a single
//! immutable [`TipsetRef`] so a whole report reflects one consistent chain
//! snapshot. Nothing here performs retries; those belong to trait
//! implementations.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::smooth::FilterEstimate;
use crate::{ChainEpoch, DealWeight, SectorNumber, SectorSize, TokenAmount};

/// A Filecoin address in textual form, e.g. `f01234`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Address {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let network = chars.next();
        let protocol = chars.next();
        let payload = chars.as_str();

        let network_ok = matches!(network, Some('f') | Some('t'));
        let protocol_ok = matches!(protocol, Some('0'..='4'));
        let payload_ok = !payload.is_empty()
            && if protocol == Some('0') {
                payload.chars().all(|c| c.is_ascii_digit())
            } else {
                payload.chars().all(|c| c.is_ascii_alphanumeric())
            };

        if network_ok && protocol_ok && payload_ok {
            Ok(Address(s.to_owned()))
        } else {
            Err(Error::InvalidAddress(s.to_owned()))
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable reference to the chain snapshot a report is computed against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TipsetRef {
    /// The implementation's current head.
    Head,
    /// The tipset at a given height.
    Height(ChainEpoch),
}

/// Selects which of a miner's sectors a query returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectorFilter {
    Live,
    Faulty,
    All,
}

/// Static miner state needed by the calculators.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MinerInfo {
    pub sector_size: SectorSize,
}

/// Immutable snapshot of a sector's on-chain record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SectorRecord {
    pub sector_number: SectorNumber,

    #[serde(rename = "DealIDs")]
    pub deal_ids: Vec<u64>,

    /// Epoch during which the sector proof was accepted.
    pub activation: ChainEpoch,

    /// Epoch during which the sector expires.
    pub expiration: ChainEpoch,

    /// Integral of active deals over sector lifetime.
    #[serde(with = "crate::json::bigint_string")]
    pub deal_weight: DealWeight,

    /// Integral of active verified deals over sector lifetime.
    #[serde(with = "crate::json::bigint_string")]
    pub verified_deal_weight: DealWeight,

    /// Pledge collected to commit this sector.
    #[serde(with = "crate::json::bigint_string")]
    pub initial_pledge: TokenAmount,

    /// Expected one day projection of reward for the sector, computed at
    /// activation time.
    #[serde(with = "crate::json::bigint_string")]
    pub expected_day_reward: TokenAmount,

    /// Expected twenty day projection of reward for the sector, computed
    /// at activation time.
    #[serde(with = "crate::json::bigint_string")]
    pub expected_storage_pledge: TokenAmount,

    /// Age of the sector this sector replaced, if any.
    #[serde(default)]
    pub replaced_sector_age: Option<ChainEpoch>,

    /// Day reward of the sector this sector replaced, or zero.
    #[serde(with = "crate::json::bigint_string")]
    pub replaced_day_reward: TokenAmount,
}

impl SectorRecord {
    /// Committed-capacity sectors back no deals.
    pub fn is_committed_capacity(&self) -> bool {
        self.deal_ids.is_empty()
    }

    /// Committed lifetime of the sector in epochs.
    pub fn duration(&self) -> ChainEpoch {
        self.expiration - self.activation
    }
}

/// The chain state queries the reporting engine consumes. All calls are
/// keyed by a tipset reference so a report is computed against one
/// consistent snapshot; estimates are re-fetched per report, never cached.
#[async_trait]
pub trait ChainQuery: Send + Sync {
    /// Resolves the epoch of a tipset reference.
    async fn tipset_epoch(&self, ts: &TipsetRef) -> Result<ChainEpoch, Error>;

    /// Enumerates every storage provider known at the reference tipset.
    async fn list_miners(&self, ts: &TipsetRef) -> Result<Vec<Address>, Error>;

    async fn miner_info(&self, miner: &Address, ts: &TipsetRef) -> Result<MinerInfo, Error>;

    /// Returns the miner's sectors selected by `filter`, in chain order.
    async fn miner_sectors(
        &self,
        miner: &Address,
        filter: SectorFilter,
        ts: &TipsetRef,
    ) -> Result<Vec<SectorRecord>, Error>;

    /// The network reward series from the reward actor state.
    async fn reward_estimate(&self, ts: &TipsetRef) -> Result<FilterEstimate, Error>;

    /// The network quality-adjusted power series from the power actor
    /// state.
    async fn power_estimate(&self, ts: &TipsetRef) -> Result<FilterEstimate, Error>;
}
