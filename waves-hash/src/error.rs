// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;

/// Errors of the hash component.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum WavesHashError {
    /// Parsing error: {0}
    ParsingError(String),
    /// Wrong prefix for hash: expected {0}, got {1}
    WrongPrefix(String, String),
}
