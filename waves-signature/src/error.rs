// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;

/// Errors of the signature component.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum WavesSignatureError {
    /// Parsing error: {0}
    ParsingError(String),
    /// Signature verification failed: {0}
    SignatureError(String),
    /// Wrong prefix for key: expected {0}, got {1}
    WrongPrefix(String, String),
}
