// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use std::cmp::Ordering;
use waves_models::config::{GAS_COST_FLAT, GAS_COST_INVOKE};
use waves_models::transaction::{Transaction, TransactionId};
use waves_time::WavesTime;

/// A pooled unconfirmed transaction with its admission metadata.
#[derive(Debug, Clone)]
pub(crate) struct UtxEntry {
    pub transaction: Transaction,
    pub received_at: WavesTime,
    pub size_bytes: u64,
    pub cursor: UtxCursor,
}

/// Selection-order key of a pooled entry.
///
/// Greatest fee density first; ties broken by earlier arrival, then by
/// lexicographically smaller id. Densities are compared by cross
/// multiplication so no precision is lost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct UtxCursor {
    pub fee: u64,
    pub size_bytes: u64,
    pub received_at: WavesTime,
    pub id: TransactionId,
}

impl UtxCursor {
    pub(crate) fn get_id(&self) -> TransactionId {
        self.id
    }

    /// `self` denser than `other` by at least `bump_percent` percent.
    pub(crate) fn outbids(&self, other: &UtxCursor, bump_percent: u64) -> bool {
        let lhs = (self.fee as u128) * (other.size_bytes as u128) * 100;
        let rhs = (other.fee as u128) * (self.size_bytes as u128) * (100 + bump_percent as u128);
        lhs >= rhs
    }
}

impl Ord for UtxCursor {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = (self.fee as u128) * (other.size_bytes as u128);
        let rhs = (other.fee as u128) * (self.size_bytes as u128);
        // reversed: a denser entry sorts first
        rhs.cmp(&lhs)
            .then_with(|| self.received_at.cmp(&other.received_at))
            .then_with(|| self.id.cmp(&other.id))
    }
}

impl PartialOrd for UtxCursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Gas charged when the transaction enters a block.
pub(crate) fn gas_cost(transaction: &Transaction) -> u64 {
    match transaction {
        Transaction::InvokeScript(_) => GAS_COST_INVOKE,
        _ => GAS_COST_FLAT,
    }
}
