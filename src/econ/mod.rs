// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Sector economics: quality-adjusted power and termination penalties.

pub mod policy;
pub mod quality;
pub mod termination;

pub use policy::{Policy, EPOCHS_IN_DAY};
pub use quality::{qa_power_for_sector, qa_power_for_weight, quality_for_weight};
pub use termination::{
    expected_reward_for_power, pledge_penalty_for_termination,
    pledge_penalty_for_termination_lower_bound, split_termination_penalty, termination_penalty,
    TerminationSplit,
};
