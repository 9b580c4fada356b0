// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

use thiserror::Error;

use crate::chain::Address;

/// Errors surfaced by the reporting engine and its chain-query boundary.
///
/// Single-report paths fail fast and surface the first error unmodified;
/// batch runs isolate per-miner failures and continue.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input address string.
    #[error("invalid address: {0}")]
    InvalidAddress(String),
    /// The queried address has no on-chain actor at the reference epoch.
    #[error("actor not found: {0}")]
    ActorNotFound(Address),
    /// Fetched raw state could not be decoded as the expected actor type.
    #[error("failed to decode actor state: {0}")]
    ActorStateDecode(String),
    /// An arithmetic parameter that is used as a divisor was zero. This is
    /// a contract violation, not a recoverable condition.
    #[error("division by zero")]
    DivisionByZero,
    /// The chain-query collaborator could not answer.
    #[error("chain query failed: {0}")]
    Query(String),
}
