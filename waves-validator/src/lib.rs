// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Pure block and transaction validation.
//!
//! `validate_block` is a pure function of a candidate block and a parent
//! snapshot: it never writes, and the same inputs always yield the same
//! verdict. On success it returns the application diff so the applier commits
//! exactly what was validated.

#![warn(unused_crate_dependencies)]

mod error;
pub mod pos;

pub use error::{TxValidationError, ValidationError};

use tracing::trace;
use waves_models::block::{Block, MAX_FEATURES_PER_BLOCK};
use waves_models::config::{
    BASE_TARGET_WINDOW, GENERATING_BALANCE_DEPTH, MAX_TIMESTAMP_DRIFT_MS, MIN_GENERATING_BALANCE,
    MIN_TRANSACTION_FEE,
};
use waves_models::scheme::Scheme;
use waves_models::transaction::{Transaction, MAX_TRANSACTION_SIZE_BYTES};
use waves_state_exports::{BlockDiff, StateOverlay, StateReader};
use waves_time::WavesTime;

/// Stateless and cheap per-transaction checks shared by UTX admission and
/// block validation.
pub fn validate_transaction(
    scheme: Scheme,
    transaction: &Transaction,
) -> Result<(), TxValidationError> {
    if transaction.chain_id() != scheme.to_byte() {
        return Err(TxValidationError::WrongChainId(
            transaction.chain_id(),
            scheme.to_byte(),
        ));
    }
    if transaction.fee() < MIN_TRANSACTION_FEE {
        return Err(TxValidationError::FeeTooLow);
    }
    let size = transaction
        .serialized_size()
        .map_err(|err| TxValidationError::Malformed(err.to_string()))?;
    if size > MAX_TRANSACTION_SIZE_BYTES as u64 {
        return Err(TxValidationError::TooLarge);
    }
    if let Transaction::Data(tx) = transaction {
        for entry in &tx.entries {
            entry
                .check_limits()
                .map_err(|err| TxValidationError::Malformed(err.to_string()))?;
        }
    }
    transaction
        .verify_signature()
        .map_err(|_| TxValidationError::BadSignature)?;
    Ok(())
}

/// Validate a transaction against a snapshot and stage its effects into the
/// overlay, so later transactions of the same block observe them.
pub fn validate_transaction_stateful(
    scheme: Scheme,
    transaction: &Transaction,
    overlay: &mut StateOverlay,
) -> Result<(), TxValidationError> {
    validate_transaction(scheme, transaction)?;
    let id = transaction
        .compute_id()
        .map_err(|err| TxValidationError::Malformed(err.to_string()))?;
    if overlay.contains_transaction(&id) {
        return Err(TxValidationError::AlreadyConfirmed);
    }
    overlay.apply_transaction(transaction).map_err(|err| {
        use waves_state_exports::StateError::*;
        match err {
            InsufficientFunds(_) => TxValidationError::InsufficientFunds,
            TransactionAlreadyConfirmed(_) => TxValidationError::AlreadyConfirmed,
            other => TxValidationError::Malformed(other.to_string()),
        }
    })
}

/// Validate a candidate block against the snapshot of its parent.
///
/// The snapshot tip must be the declared parent. On success the returned
/// [`BlockDiff`] holds the exact application effects (balances, ordered data
/// writes, confirmed ids) including the generator fee and reward credit.
pub fn validate_block(
    scheme: Scheme,
    block: &Block,
    parent_snapshot: &dyn StateReader,
    now: WavesTime,
) -> Result<BlockDiff, ValidationError> {
    let (parent_height, parent_id) = parent_snapshot.tip().ok_or(ValidationError::ParentUnknown)?;
    if block.header.parent_id != parent_id {
        return Err(ValidationError::ParentMismatch);
    }
    if block.header.height != parent_height + 1 {
        return Err(ValidationError::MalformedHeader(format!(
            "height {} on parent at {}",
            block.header.height, parent_height
        )));
    }
    if block.header.features.len() > MAX_FEATURES_PER_BLOCK as usize {
        return Err(ValidationError::MalformedHeader(
            "too many feature votes".into(),
        ));
    }

    // producer signature over the header digest
    block
        .verify_signature()
        .map_err(|_| ValidationError::BadSignature)?;

    let parent = parent_snapshot
        .block_at_height(parent_height)
        .ok_or(ValidationError::ParentUnknown)?;

    // timestamp window: (parent, now + drift]
    if block.header.timestamp <= parent.header.timestamp
        || block.header.timestamp
            > now.saturating_add(WavesTime::from_millis(MAX_TIMESTAMP_DRIFT_MS))
    {
        return Err(ValidationError::TimestampOutOfWindow);
    }

    // vrf proof against the parent generation signature, then the chained
    // generation signature
    let vrf_output = pos::verify_vrf(
        &block.header.generator,
        &parent.header.generation_signature,
        &block.header.vrf_proof,
    )
    .map_err(|_| ValidationError::BadVrf)?;
    if block.header.generation_signature
        != pos::next_generation_signature(&parent.header.generation_signature, &vrf_output)
    {
        return Err(ValidationError::BadVrf);
    }

    // deterministic retarget over the trailing window
    let window_start = parent_height.saturating_sub(BASE_TARGET_WINDOW - 1).max(1);
    let mut recent = Vec::with_capacity((parent_height - window_start + 1) as usize);
    for height in window_start..=parent_height {
        let header = parent_snapshot
            .block_at_height(height)
            .ok_or(ValidationError::ParentUnknown)?
            .header;
        recent.push(header);
    }
    if block.header.base_target != pos::expected_base_target(&recent) {
        return Err(ValidationError::BaseTargetWrong);
    }

    // generating balance and the hit condition. The snapshot tip is the
    // parent, one block behind the candidate, so the depth shifts by one and
    // the measure lands at candidate height minus the generating-balance
    // depth exactly.
    let generator_address =
        waves_models::address::Address::from_public_key(scheme, &block.header.generator);
    let generating_balance =
        parent_snapshot.generating_balance(&generator_address, GENERATING_BALANCE_DEPTH - 1);
    if generating_balance < MIN_GENERATING_BALANCE {
        return Err(ValidationError::GeneratorIneligible);
    }
    let delta_ms = block
        .header
        .timestamp
        .saturating_sub(parent.header.timestamp)
        .to_millis();
    if !pos::is_eligible(
        pos::hit(&vrf_output),
        block.header.base_target,
        generating_balance,
        delta_ms,
    ) {
        return Err(ValidationError::GeneratorIneligible);
    }

    // transactions against the evolving snapshot
    let mut overlay = StateOverlay::new(scheme, parent_snapshot);
    for transaction in &block.transactions {
        if let Err(kind) = validate_transaction_stateful(scheme, transaction, &mut overlay) {
            let tx_id = transaction
                .compute_id()
                .unwrap_or(waves_models::transaction::TransactionId(
                    waves_hash::Hash::compute_from(&[]),
                ));
            return Err(ValidationError::TxRuleViolated { tx_id, kind });
        }
    }

    // generator collects fees and the block reward
    overlay.credit(
        generator_address,
        block.total_fees().saturating_add(block.header.reward),
    );

    // declared state root, when present
    if let Some(declared) = &block.header.state_root {
        if *declared != overlay.state_root() {
            return Err(ValidationError::StateRootMismatch);
        }
    }

    trace!(
        "validated block {} at height {}",
        block.id,
        block.header.height
    );
    Ok(overlay.into_diff())
}

#[cfg(test)]
mod tests;
