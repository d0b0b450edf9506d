// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;

/// models error
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum ModelsError {
    /// hashing error
    HashError,
    /// Serialization error: {0}
    SerializeError(String),
    /// Deserialization error: {0}
    DeserializeError(String),
    /// buffer error: {0}
    BufferError(String),
    /// block id parsing error
    BlockIdParseError,
    /// transaction id parsing error
    TransactionIdParseError,
    /// address parsing error
    AddressParseError,
    /// checked operation error: {0}
    CheckedOperationError(String),
    /// amount parse error: {0}
    AmountParseError(String),
    /// wrong chain id: expected {0}, got {1}
    WrongChainId(u8, u8),
    /// unknown transaction type {0} version {1}
    UnknownTransactionType(u8, u8),
    /// data entry too large: {0}
    DataEntryTooLarge(String),
    /// signature error: {0}
    SignatureError(#[from] waves_signature::WavesSignatureError),
    /// time error: {0}
    TimeError(#[from] waves_time::TimeError),
    /// invalid configuration: {0}
    InvalidConfiguration(String),
}

impl From<waves_serialization::SerializeError> for ModelsError {
    fn from(err: waves_serialization::SerializeError) -> Self {
        ModelsError::SerializeError(err.to_string())
    }
}
