// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;

/// Errors of the time component.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum TimeError {
    /// Could not convert between time units
    ConversionError,
    /// Time overflow error
    TimeOverflowError,
    /// Checked operation error: {0}
    CheckedOperationError(String),
}
