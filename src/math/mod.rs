// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Fixed-point big-integer helpers for the smoothed reward/power math.
//!
//! Everything here operates on Q.128 values: integers carrying 128 binary
//! bits of fractional precision. The precision constants are protocol
//! parameters; changing either silently diverges from chain-canonical
//! figures.

use num_bigint::{BigInt, ParseBigIntError};
use num_integer::Integer;

/// Binary fractional precision of the reward/power filter math.
pub const PRECISION: u64 = 128;

/// Binary fractional precision of the sector quality multiplier.
pub const SECTOR_QUALITY_PRECISION: u64 = 20;

/// Parses a slice of Q.128 coefficients given in decimal-string form.
pub fn poly_parse(coefs: &[&str]) -> Result<Vec<BigInt>, ParseBigIntError> {
    coefs.iter().map(|c| c.parse()).collect()
}

/// Evaluates a polynomial with Q.128 coefficients at a Q.128 point using
/// Horner's method. Each intermediate product is shifted back down to
/// Q.128 before the next term is added, matching the reference truncation
/// order.
pub fn poly_val(poly: &[BigInt], x: &BigInt) -> BigInt {
    let mut res = BigInt::default();
    for coeff in poly {
        res = ((res * x) >> PRECISION) + coeff;
    }
    res
}

/// Floored integer division, `n / d` rounded toward negative infinity.
/// This is the single rounding rule of the filter math.
pub fn div_floor(n: &BigInt, d: &BigInt) -> BigInt {
    n.div_floor(d)
}
