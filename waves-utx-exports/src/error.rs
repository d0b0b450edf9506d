// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;
use waves_validator::TxValidationError;

/// Verdict of a failed UTX admission.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum AdmissionError {
    /// an entry with this id is already pooled
    AlreadyKnown,
    /// transaction timestamp is older than the pool time-to-live
    Expired,
    /// fee below the admission minimum
    InsufficientFee,
    /// fee density too low to displace pooled entries
    ReplacementUnderpriced,
    /// pool budgets exhausted
    PoolFull,
    /// validation failed: {0}
    ValidationFailed(TxValidationError),
}
