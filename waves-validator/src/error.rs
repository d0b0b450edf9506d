// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;
use waves_models::transaction::TransactionId;

/// Reason a single transaction failed validation.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum TxValidationError {
    /// proof does not verify against the sender key
    BadSignature,
    /// declared chain id {0} does not match the network {1}
    WrongChainId(u8, u8),
    /// transaction already confirmed on chain
    AlreadyConfirmed,
    /// sender cannot cover fee and outgoing funds
    InsufficientFunds,
    /// fee below the protocol minimum
    FeeTooLow,
    /// serialized size exceeds the protocol maximum
    TooLarge,
    /// malformed transaction: {0}
    Malformed(String),
}

impl TxValidationError {
    /// Whether the failure can never resolve itself (the transaction is
    /// garbage, not merely unlucky). Permanent failures evict from the UTX
    /// pool; transient ones only skip.
    pub fn is_permanent(&self) -> bool {
        !matches!(self, TxValidationError::InsufficientFunds)
    }
}

/// Verdict of block validation.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// malformed header: {0}
    MalformedHeader(String),
    /// producer signature does not verify
    BadSignature,
    /// vrf proof or generation signature chain does not verify
    BadVrf,
    /// timestamp outside the tolerated window
    TimestampOutOfWindow,
    /// parent block is not known
    ParentUnknown,
    /// declared parent does not match the snapshot tip
    ParentMismatch,
    /// declared base target does not match the retarget schedule
    BaseTargetWrong,
    /// generator is not eligible to produce this block
    GeneratorIneligible,
    /// transaction {tx_id} violates a rule: {kind}
    TxRuleViolated {
        /// offending transaction
        tx_id: TransactionId,
        /// the violated rule
        kind: TxValidationError,
    },
    /// declared state root does not match the applied snapshot
    StateRootMismatch,
}
