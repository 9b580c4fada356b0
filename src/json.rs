// Copyright 2019-2024 ChainSafe Systems
// SPDX-License-Identifier: Apache-2.0, MIT

//! Serde helpers for report serialization.

/// Serializes a `BigInt` as a decimal string, the way Lotus renders token
/// amounts and power figures in JSON.
pub mod bigint_string {
    use num_bigint::BigInt;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(int: &BigInt, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(int)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<BigInt, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use num_bigint::BigInt;
    use serde::{Deserialize, Serialize};

    #[derive(Serialize, Deserialize)]
    struct Amount(#[serde(with = "super::bigint_string")] BigInt);

    #[test]
    fn bigint_round_trips_as_decimal_string() {
        let amount = Amount(BigInt::from(-123456789012345678901234567890_i128));
        let json = serde_json::to_string(&amount).unwrap();
        assert_eq!("\"-123456789012345678901234567890\"", json);
        let back: Amount = serde_json::from_str(&json).unwrap();
        assert_eq!(amount.0, back.0);
    }
}
