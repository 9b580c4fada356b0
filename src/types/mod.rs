// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Base chain quantities shared across the crate. All token and power
//! figures are arbitrary-precision signed integers; fixed-width types
//! would silently truncate and corrupt every downstream figure.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

/// Epoch number of the chain.
pub type ChainEpoch = i64;

/// Token amount in attoFIL.
pub type TokenAmount = BigInt;

/// Storage power in bytes (raw or quality-adjusted).
pub type StoragePower = BigInt;

/// Space-time of active deals over a sector's lifetime.
pub type DealWeight = BigInt;

/// Dimensionless quality multiplier, Q.20 fixed point.
pub type SectorQuality = BigInt;

/// Sector identifier unique within a miner.
pub type SectorNumber = u64;

/// The legal on-chain sector sizes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u64", try_from = "u64")]
#[repr(u64)]
pub enum SectorSize {
    _2KiB = 2 << 10,
    _8MiB = 8 << 20,
    _512MiB = 512 << 20,
    _32GiB = 32 << 30,
    _64GiB = 64 << 30,
}

impl SectorSize {
    pub fn bytes(self) -> u64 {
        self as u64
    }
}

impl From<SectorSize> for u64 {
    fn from(size: SectorSize) -> Self {
        size as u64
    }
}

impl TryFrom<u64> for SectorSize {
    type Error = String;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        match value {
            x if x == SectorSize::_2KiB as u64 => Ok(SectorSize::_2KiB),
            x if x == SectorSize::_8MiB as u64 => Ok(SectorSize::_8MiB),
            x if x == SectorSize::_512MiB as u64 => Ok(SectorSize::_512MiB),
            x if x == SectorSize::_32GiB as u64 => Ok(SectorSize::_32GiB),
            x if x == SectorSize::_64GiB as u64 => Ok(SectorSize::_64GiB),
            other => Err(format!("unsupported sector size: {other}")),
        }
    }
}
