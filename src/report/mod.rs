// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Report documents produced by the engine and their delivery seam.

pub mod expiration;

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::chain::{Address, SectorRecord};
use crate::econ::TerminationSplit;
use crate::{ChainEpoch, TokenAmount};

pub use expiration::{expiration_buckets, CalendarAnchor, ExpirationBucket, ExpirationReport};

/// Selects a contiguous run of sectors out of a larger set.
///
/// The window is applied only when it fits entirely inside the set;
/// otherwise the whole set is reported.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SectorWindow {
    pub offset: usize,
    pub count: usize,
}

/// Estimated consequences of terminating a run of a miner's sectors.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PenaltyReport {
    pub current_epoch: ChainEpoch,

    pub miner: Address,

    /// How many sectors matched the filter before windowing.
    pub total_sector_count: usize,

    /// How many sectors the fine below covers.
    pub terminated_count: usize,

    /// Raw-byte power removed by the termination, human readable.
    pub lost_power: String,

    /// Aggregate termination fine in attoFIL.
    #[serde(with = "crate::json::bigint_string")]
    pub fine: TokenAmount,

    /// The fine split between committed-capacity and deal sectors.
    pub split: TerminationSplit,

    /// The sector records the fine was computed over.
    pub sectors: Vec<SectorRecord>,
}

/// Aggregates of a single miner's sector economics at one tipset.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MinerSectorsSummary {
    pub miner: Address,

    pub height: ChainEpoch,

    pub sector_count: usize,

    /// Sum of pledge collected to commit the sectors.
    #[serde(with = "crate::json::bigint_string")]
    pub all_initial_pledge: TokenAmount,

    /// Sum of the sectors' expected one day reward projections.
    #[serde(with = "crate::json::bigint_string")]
    pub all_expected_day_reward: TokenAmount,

    /// Sum of the sectors' expected twenty day reward projections.
    #[serde(with = "crate::json::bigint_string")]
    pub all_expected_storage_pledge: TokenAmount,

    /// Sum of the day rewards of the sectors these sectors replaced.
    #[serde(with = "crate::json::bigint_string")]
    pub all_replaced_day_reward: TokenAmount,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sectors: Option<Vec<SectorRecord>>,
}

/// Any document the engine can emit. Untagged: each variant's field set
/// identifies it on the wire.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Report {
    Penalty(PenaltyReport),
    Summary(MinerSectorsSummary),
    Expiration(ExpirationReport),
}

/// Where finished reports go. Implementations own formatting and
/// transport; delivery failures do not abort the producing batch.
pub trait ReportSink {
    fn deliver(&mut self, report: &Report) -> anyhow::Result<()>;
}

/// Writes each report as pretty-printed JSON followed by a newline.
pub struct JsonReportSink<W> {
    writer: W,
}

impl<W: Write> JsonReportSink<W> {
    pub fn new(writer: W) -> Self {
        JsonReportSink { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> ReportSink for JsonReportSink<W> {
    fn deliver(&mut self, report: &Report) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, report)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}
