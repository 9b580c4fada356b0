// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Smoothed time-series estimates and their extrapolation.
//!
//! A [`FilterEstimate`] is the linear model produced by the network's
//! alpha-beta filter: a position at the reference epoch and a velocity per
//! epoch, both Q.128. The network reward and network quality-adjusted
//! power series both arrive in this form, and projections over a future
//! window are taken by integrating the ratio of the two models in closed
//! form.

use lazy_static::lazy_static;
use num_bigint::BigInt;
use num_traits::Zero;
use serde::{Deserialize, Serialize};

use crate::math::{div_floor, poly_parse, poly_val, PRECISION};
use crate::ChainEpoch;

lazy_static! {
    /// Coefficients of the numerator polynomial of the Padé approximant of
    /// ln(x) on [1, 2), Q.128.
    static ref LN_NUM_COEF: Vec<BigInt> = poly_parse(&[
        "261417938209272870992496419296200268025",
        "7266615505142943436908456158054846846897",
        "32458783941900493142649393804518050491988",
        "17078670566130897220338060387082146864806",
        "-35150353308172866634071793531642638290419",
        "-20351202052858059355702509232125230498980",
        "-1563932590352680681114104005183375350999",
    ])
    .expect("could not parse ln numerator coefficients");

    /// Coefficients of the denominator polynomial of the Padé approximant
    /// of ln(x) on [1, 2), Q.128.
    static ref LN_DENOM_COEF: Vec<BigInt> = poly_parse(&[
        "49928077726659937662124949977867279384",
        "2508163877009111928787629628566491583383",
        "21757751789594546643737445330202599887121",
        "53400635271583923415775576342898617051826",
        "41248834748603606604000911015235164348839",
        "9015227820322455780436733526367238305537",
        "340282366920938463463374607431768211456",
    ])
    .expect("could not parse ln denominator coefficients");

    /// Q.128 value of ln(2).
    static ref LN_2: BigInt = "235865763225513294137944142764154484399"
        .parse()
        .expect("could not parse ln2");

    /// Q.128 value of 2^-50: below this squared denominator velocity the
    /// logarithmic form degenerates and the midpoint form is used instead.
    static ref EPSILON: BigInt = "302231454903657293676544"
        .parse()
        .expect("could not parse epsilon");
}

/// Linear model of a smoothed chain quantity: `position` at the reference
/// epoch, drifting by `velocity` per epoch. Both terms are Q.128.
#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterEstimate {
    pub position: BigInt,
    pub velocity: BigInt,
}

impl FilterEstimate {
    /// Builds an estimate from Q.0 position and velocity.
    pub fn new(position: BigInt, velocity: BigInt) -> Self {
        FilterEstimate {
            position: position << PRECISION,
            velocity: velocity << PRECISION,
        }
    }

    /// Builds an estimate from terms already in Q.128, as fetched from
    /// chain state.
    pub fn from_q128(position: BigInt, velocity: BigInt) -> Self {
        FilterEstimate { position, velocity }
    }

    /// Returns the Q.0 position estimate: the value "right now", with the
    /// velocity term ignored.
    pub fn estimate(&self) -> BigInt {
        &self.position >> PRECISION
    }

    /// Extrapolates the position `delta` epochs ahead. Output is Q.256 for
    /// use as the numerator of a ratio.
    pub fn extrapolate(&self, delta: ChainEpoch) -> BigInt {
        let delta_t = BigInt::from(delta) << PRECISION; // Q.0 => Q.128
        let position = &self.position << PRECISION; // Q.128 => Q.256
        (&self.velocity * delta_t) + position
    }
}

/// The natural log of a strictly positive Q.128 value, Q.128.
///
/// The argument is range-reduced to [1, 2) by a power-of-two shift, the
/// Padé approximant is evaluated there, and `k * ln2` is added back.
pub fn ln(z: &BigInt) -> BigInt {
    let k: i64 = (z.bits() as i64) - 1 - (PRECISION as i64); // Q.0
    let x: BigInt = if k > 0 { z >> k as u64 } else { z << (-k) as u64 };

    (BigInt::from(k) * &*LN_2) + ln_between_one_and_two(&x)
}

fn ln_between_one_and_two(x: &BigInt) -> BigInt {
    let num = poly_val(&LN_NUM_COEF, x);
    let denom = poly_val(&LN_DENOM_COEF, x);
    div_floor(&(num << PRECISION), &denom)
}

/// Closed-form integral of `num(t) / denom(t)` over
/// `[relative_start, relative_start + delta]`, both inputs linear filter
/// models. Output is Q.128.
///
/// When the denominator's velocity is significant the exact antiderivative
/// `v1*t/v2 + (p1*v2 - p2*v1) * ln(p2 + v2*t) / v2^2` is evaluated at the
/// window bounds; otherwise the numerator is integrated against the
/// denominator's (effectively constant) position using the midpoint value.
/// Every division floors; the sequence of truncations is part of the
/// observable contract.
pub fn extrapolated_cum_sum_of_ratio(
    delta: ChainEpoch,
    relative_start: ChainEpoch,
    est_num: &FilterEstimate,
    est_denom: &FilterEstimate,
) -> BigInt {
    // An empty window integrates to zero on every path, including the
    // degenerate-denominator fallback below.
    if delta == 0 {
        return BigInt::zero();
    }

    let delta_t = BigInt::from(delta) << PRECISION; // Q.0 => Q.128
    let t0 = BigInt::from(relative_start) << PRECISION; // Q.0 => Q.128

    let position1 = &est_num.position;
    let position2 = &est_denom.position;
    let velocity1 = &est_num.velocity;
    let velocity2 = &est_denom.velocity;

    let squared_velocity2: BigInt = (velocity2 * velocity2) >> PRECISION; // Q.256 => Q.128

    if squared_velocity2 > *EPSILON {
        let mut x2a: BigInt = (&t0 * velocity2) >> PRECISION; // Q.256 => Q.128
        x2a += position2;

        let mut x2b: BigInt = ((&t0 + &delta_t) * velocity2) >> PRECISION; // Q.256 => Q.128
        x2b += position2;

        let x2a = ln(&x2a); // Q.128
        let x2b = ln(&x2b); // Q.128

        // v1*v2*deltaT
        let m1: BigInt = (velocity1 * (velocity2 * &delta_t)) >> PRECISION; // Q.384 => Q.256
        // (p1*v2 - p2*v1) * (ln(x2b) - ln(x2a))
        let m2: BigInt = (((position1 * velocity2) >> PRECISION)
            - ((position2 * velocity1) >> PRECISION))
            * (x2b - x2a); // Q.128 * Q.128 => Q.256

        return div_floor(&(m1 + m2), &squared_velocity2); // Q.256 / Q.128 => Q.128
    }

    if position2.is_zero() {
        // Degenerate denominator: both its terms are (effectively) zero.
        // Fall back to the numerator's instantaneous value rather than
        // dividing by zero.
        return position1.clone();
    }

    let half_delta_t = &delta_t >> 1u64; // Q.128
    let mut x1m: BigInt = (velocity1 * (&t0 + half_delta_t)) >> PRECISION; // Q.256 => Q.128
    x1m += position1;

    div_floor(&(x1m * delta_t), position2) // Q.256 / Q.128 => Q.128
}
