// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::ModelsError;
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;
use waves_serialization::{
    Deserializer, SerializeError, Serializer, U64VarIntDeserializer, U64VarIntSerializer,
};

/// Number of decimal places in an `Amount`.
pub const AMOUNT_DECIMAL_SCALE: u32 = 8;

const AMOUNT_DECIMAL_FACTOR: u64 = 10u64.pow(AMOUNT_DECIMAL_SCALE);

/// A token amount counted in indivisible units (10^-8 of a whole token).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    SerializeDisplay,
    DeserializeFromStr,
)]
pub struct Amount(u64);

impl Amount {
    /// Zero amount.
    pub const ZERO: Amount = Amount(0);

    /// Build from a raw unit count.
    pub const fn from_raw(raw: u64) -> Self {
        Amount(raw)
    }

    /// Raw unit count.
    pub const fn to_raw(self) -> u64 {
        self.0
    }

    /// Saturating addition.
    #[must_use]
    pub fn saturating_add(self, other: Amount) -> Self {
        Amount(self.0.saturating_add(other.0))
    }

    /// Saturating subtraction.
    #[must_use]
    pub fn saturating_sub(self, other: Amount) -> Self {
        Amount(self.0.saturating_sub(other.0))
    }

    /// Checked addition.
    pub fn checked_add(self, other: Amount) -> Result<Self, ModelsError> {
        self.0
            .checked_add(other.0)
            .map(Amount)
            .ok_or_else(|| ModelsError::CheckedOperationError("amount addition".into()))
    }

    /// Checked subtraction.
    pub fn checked_sub(self, other: Amount) -> Result<Self, ModelsError> {
        self.0
            .checked_sub(other.0)
            .map(Amount)
            .ok_or_else(|| ModelsError::CheckedOperationError("amount subtraction".into()))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.0 / AMOUNT_DECIMAL_FACTOR;
        let frac = self.0 % AMOUNT_DECIMAL_FACTOR;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            let frac_str = format!("{:08}", frac);
            write!(f, "{}.{}", whole, frac_str.trim_end_matches('0'))
        }
    }
}

impl FromStr for Amount {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (whole_str, frac_str) = match s.split_once('.') {
            Some((w, fr)) => (w, fr),
            None => (s, ""),
        };
        if frac_str.len() > AMOUNT_DECIMAL_SCALE as usize {
            return Err(ModelsError::AmountParseError(format!(
                "too many decimal places in {}",
                s
            )));
        }
        let whole: u64 = whole_str
            .parse()
            .map_err(|_| ModelsError::AmountParseError(s.to_string()))?;
        let frac: u64 = if frac_str.is_empty() {
            0
        } else {
            let padded = format!("{:0<8}", frac_str);
            padded
                .parse()
                .map_err(|_| ModelsError::AmountParseError(s.to_string()))?
        };
        whole
            .checked_mul(AMOUNT_DECIMAL_FACTOR)
            .and_then(|w| w.checked_add(frac))
            .map(Amount)
            .ok_or_else(|| ModelsError::AmountParseError(format!("amount overflow in {}", s)))
    }
}

/// Serializer for `Amount`
#[derive(Default, Clone)]
pub struct AmountSerializer {
    u64_serializer: U64VarIntSerializer,
}

impl AmountSerializer {
    /// Creates a serializer for `Amount`
    pub const fn new() -> Self {
        Self {
            u64_serializer: U64VarIntSerializer::new(),
        }
    }
}

impl Serializer<Amount> for AmountSerializer {
    fn serialize(&self, value: &Amount, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.u64_serializer.serialize(&value.to_raw(), buffer)
    }
}

/// Deserializer for `Amount`
#[derive(Clone)]
pub struct AmountDeserializer {
    u64_deserializer: U64VarIntDeserializer,
}

impl AmountDeserializer {
    /// Creates a deserializer for `Amount`
    pub const fn new() -> Self {
        Self {
            u64_deserializer: U64VarIntDeserializer::new(
                std::ops::Bound::Included(0),
                std::ops::Bound::Included(u64::MAX),
            ),
        }
    }
}

impl Default for AmountDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer<Amount> for AmountDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Amount, E> {
        context("Failed Amount deserialization", |input| {
            self.u64_deserializer
                .deserialize(input)
                .map(|(rest, raw)| (rest, Amount::from_raw(raw)))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_and_parse() {
        let amount = Amount::from_raw(1_50000000);
        assert_eq!(amount.to_string(), "1.5");
        assert_eq!(Amount::from_str("1.5").unwrap(), amount);
        assert_eq!(Amount::from_str("0.00000001").unwrap(), Amount::from_raw(1));
        assert_eq!(Amount::from_str("3").unwrap(), Amount::from_raw(3_00000000));
        assert!(Amount::from_str("0.000000001").is_err());
    }

    #[test]
    fn checked_ops() {
        let a = Amount::from_raw(10);
        let b = Amount::from_raw(4);
        assert_eq!(a.checked_sub(b).unwrap(), Amount::from_raw(6));
        assert!(b.checked_sub(a).is_err());
        assert_eq!(b.saturating_sub(a), Amount::ZERO);
    }
}
