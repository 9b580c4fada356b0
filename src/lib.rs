// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Sector-economics reporting for Filecoin storage providers.
//!
//! The crate turns on-chain miner state into three report shapes:
//! termination-penalty estimates, per-miner sector summaries, and
//! calendar-bucketed expiration schedules. Chain access is abstracted
//! behind [`chain::ChainQuery`], report delivery behind
//! [`report::ReportSink`]; everything in between is deterministic
//! big-integer arithmetic matching the protocol's fixed-point math.

pub mod batch;
pub mod chain;
pub mod econ;
pub mod engine;
pub mod error;
pub mod json;
pub mod math;
pub mod report;
pub mod smooth;
pub mod types;

pub use batch::{network_expiration_report, run_daily, BatchConfig, BatchOutcome};
pub use chain::{Address, ChainQuery, MinerInfo, SectorFilter, SectorRecord, TipsetRef};
pub use econ::Policy;
pub use engine::ReportEngine;
pub use error::Error;
pub use report::{
    CalendarAnchor, ExpirationBucket, ExpirationReport, JsonReportSink, MinerSectorsSummary,
    PenaltyReport, Report, ReportSink, SectorWindow,
};
pub use smooth::FilterEstimate;
pub use types::*;
