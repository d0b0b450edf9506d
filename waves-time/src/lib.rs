// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Unsigned millisecond time management.

#![warn(missing_docs)]

mod error;
pub use error::TimeError;

use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use waves_serialization::{
    Deserializer, SerializeError, Serializer, U64VarIntDeserializer, U64VarIntSerializer,
};

/// Time structure used everywhere.
/// Milliseconds since 01/01/1970.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WavesTime(u64);

impl fmt::Display for WavesTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_millis())
    }
}

impl FromStr for WavesTime {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(WavesTime(
            u64::from_str(s).map_err(|_| TimeError::ConversionError)?,
        ))
    }
}

impl From<u64> for WavesTime {
    fn from(value: u64) -> Self {
        WavesTime(value)
    }
}

impl WavesTime {
    /// Smallest representable time.
    pub const ZERO: WavesTime = WavesTime(0);

    /// Builds from a raw millisecond count.
    pub const fn from_millis(millis: u64) -> Self {
        WavesTime(millis)
    }

    /// Current system time.
    pub fn now() -> Result<Self, TimeError> {
        let now: u64 = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|_| TimeError::TimeOverflowError)?
            .as_millis()
            .try_into()
            .map_err(|_| TimeError::TimeOverflowError)?;
        Ok(WavesTime(now))
    }

    /// Raw millisecond count.
    pub const fn to_millis(&self) -> u64 {
        self.0
    }

    /// Conversion to `std::time::Duration` since the epoch.
    pub const fn to_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }

    /// Estimate the `Instant` at which this timestamp occurs, relative to the
    /// current system time.
    pub fn estimate_instant(self) -> Result<Instant, TimeError> {
        let (now_timestamp, now_instant): (WavesTime, Instant) =
            (WavesTime::now()?, Instant::now());
        now_instant
            .checked_add(self.to_duration())
            .and_then(|i| i.checked_sub(now_timestamp.to_duration()))
            .ok_or(TimeError::TimeOverflowError)
    }

    /// Saturating subtraction.
    #[must_use]
    pub fn saturating_sub(self, t: WavesTime) -> Self {
        WavesTime(self.0.saturating_sub(t.0))
    }

    /// Saturating addition.
    #[must_use]
    pub fn saturating_add(self, t: WavesTime) -> Self {
        WavesTime(self.0.saturating_add(t.0))
    }

    /// Checked subtraction.
    pub fn checked_sub(self, t: WavesTime) -> Result<Self, TimeError> {
        self.0
            .checked_sub(t.0)
            .ok_or_else(|| TimeError::CheckedOperationError("subtraction error".into()))
            .map(WavesTime)
    }

    /// Checked addition.
    pub fn checked_add(self, t: WavesTime) -> Result<Self, TimeError> {
        self.0
            .checked_add(t.0)
            .ok_or_else(|| TimeError::CheckedOperationError("addition error".into()))
            .map(WavesTime)
    }

    /// Checked multiplication by a scalar.
    pub fn checked_mul(self, factor: u64) -> Result<Self, TimeError> {
        self.0
            .checked_mul(factor)
            .ok_or_else(|| TimeError::CheckedOperationError("multiplication error".into()))
            .map(WavesTime)
    }

    /// Checked division by a scalar.
    pub fn checked_div_u64(self, divisor: u64) -> Result<Self, TimeError> {
        self.0
            .checked_div(divisor)
            .ok_or_else(|| TimeError::CheckedOperationError("division error".into()))
            .map(WavesTime)
    }
}

/// Serializer for `WavesTime`
#[derive(Clone)]
pub struct WavesTimeSerializer {
    u64_serializer: U64VarIntSerializer,
}

impl WavesTimeSerializer {
    /// Creates a `WavesTimeSerializer`
    pub fn new() -> Self {
        Self {
            u64_serializer: U64VarIntSerializer::new(),
        }
    }
}

impl Default for WavesTimeSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<WavesTime> for WavesTimeSerializer {
    fn serialize(&self, value: &WavesTime, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.u64_serializer.serialize(&value.to_millis(), buffer)
    }
}

/// Deserializer for `WavesTime`
#[derive(Clone)]
pub struct WavesTimeDeserializer {
    u64_deserializer: U64VarIntDeserializer,
}

impl WavesTimeDeserializer {
    /// Creates a `WavesTimeDeserializer` accepting the given range.
    pub fn new(range: (Bound<WavesTime>, Bound<WavesTime>)) -> Self {
        Self {
            u64_deserializer: U64VarIntDeserializer::new(
                range.0.map(|time| time.to_millis()),
                range.1.map(|time| time.to_millis()),
            ),
        }
    }
}

impl Deserializer<WavesTime> for WavesTimeDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], WavesTime, E> {
        context("Failed WavesTime deserialization", |input| {
            self.u64_deserializer
                .deserialize(input)
                .map(|(rest, res)| (rest, WavesTime::from_millis(res)))
        })(buffer)
    }
}
