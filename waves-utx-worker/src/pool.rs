// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::types::{gas_cost, UtxCursor, UtxEntry};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};
use waves_models::transaction::{Transaction, TransactionId};
use waves_state_exports::{StateOverlay, StateReader};
use waves_time::WavesTime;
use waves_utx_exports::{AdmissionError, UtxConfig, UtxStats};
use waves_validator::{validate_transaction_stateful, TxValidationError};

/// The unconfirmed-transactions pool.
///
/// Invariants: at most one entry per id; `sorted` and `entries` always agree;
/// total count and bytes stay within the configured budgets.
pub(crate) struct UtxPool {
    config: UtxConfig,
    entries: HashMap<TransactionId, UtxEntry>,
    sorted: BTreeSet<UtxCursor>,
    total_bytes: u64,
}

impl UtxPool {
    pub(crate) fn init(config: UtxConfig) -> Self {
        UtxPool {
            config,
            entries: HashMap::new(),
            sorted: BTreeSet::new(),
            total_bytes: 0,
        }
    }

    fn insert_entry(&mut self, entry: UtxEntry) {
        self.total_bytes += entry.size_bytes;
        if !self.sorted.insert(entry.cursor) {
            panic!("sorted set should not contain the entry at this point");
        }
        if self.entries.insert(entry.cursor.get_id(), entry).is_some() {
            panic!("entries map should not contain the entry at this point");
        }
    }

    fn remove_entry(&mut self, id: &TransactionId) -> Option<UtxEntry> {
        let entry = self.entries.remove(id)?;
        if !self.sorted.remove(&entry.cursor) {
            panic!("sorted set expected to contain the removed entry");
        }
        self.total_bytes -= entry.size_bytes;
        Some(entry)
    }

    /// Admit one transaction. The snapshot reflects every commit that
    /// linearized before this call.
    pub(crate) fn admit(
        &mut self,
        snapshot: &dyn StateReader,
        transaction: Transaction,
        now: WavesTime,
    ) -> Result<TransactionId, AdmissionError> {
        let id = transaction
            .compute_id()
            .map_err(|err| AdmissionError::ValidationFailed(TxValidationError::Malformed(err.to_string())))?;
        if self.entries.contains_key(&id) {
            return Err(AdmissionError::AlreadyKnown);
        }
        if now.saturating_sub(transaction.timestamp()) > self.config.utx_ttl {
            return Err(AdmissionError::Expired);
        }
        let size_bytes = transaction
            .serialized_size()
            .map_err(|err| AdmissionError::ValidationFailed(TxValidationError::Malformed(err.to_string())))?;
        if size_bytes > self.config.max_utx_bytes {
            return Err(AdmissionError::PoolFull);
        }

        // stateless rules plus funds and duplicate checks against the snapshot
        let mut overlay = StateOverlay::new(self.config.scheme, snapshot);
        validate_transaction_stateful(self.config.scheme, &transaction, &mut overlay).map_err(
            |kind| match kind {
                TxValidationError::FeeTooLow => AdmissionError::InsufficientFee,
                other => AdmissionError::ValidationFailed(other),
            },
        )?;

        let cursor = UtxCursor {
            fee: transaction.fee().to_raw(),
            size_bytes,
            received_at: now,
            id,
        };
        self.make_room(&cursor, size_bytes)?;

        self.insert_entry(UtxEntry {
            transaction,
            received_at: now,
            size_bytes,
            cursor,
        });
        trace!("utx admitted {}", id);
        Ok(id)
    }

    /// Evict enough worse-priced entries for the candidate to fit, or reject
    /// the admission.
    fn make_room(&mut self, candidate: &UtxCursor, size_bytes: u64) -> Result<(), AdmissionError> {
        let mut evict: Vec<TransactionId> = Vec::new();
        let mut count = self.entries.len();
        let mut bytes = self.total_bytes;

        // walk from the worst-priced end
        for cursor in self.sorted.iter().rev() {
            if count < self.config.max_utx_count && bytes + size_bytes <= self.config.max_utx_bytes
            {
                break;
            }
            if !candidate.outbids(cursor, self.config.replacement_fee_bump_percent) {
                return Err(AdmissionError::ReplacementUnderpriced);
            }
            evict.push(cursor.get_id());
            count -= 1;
            bytes -= cursor.size_bytes;
        }
        if count >= self.config.max_utx_count || bytes + size_bytes > self.config.max_utx_bytes {
            return Err(AdmissionError::PoolFull);
        }
        for id in evict {
            self.remove_entry(&id);
            debug!("utx displaced {} for a denser entry", id);
        }
        Ok(())
    }

    /// Drop entries by id; unknown ids are ignored.
    pub(crate) fn remove(&mut self, ids: &[TransactionId]) {
        for id in ids {
            if self.remove_entry(id).is_some() {
                trace!("utx dropped confirmed {}", id);
            }
        }
    }

    /// Whether an entry with this id is pooled.
    pub(crate) fn contains(&self, id: &TransactionId) -> bool {
        self.entries.contains_key(id)
    }

    /// Ordered candidate selection under byte and gas budgets.
    ///
    /// Deterministic for a given snapshot and pool contents: the pool order
    /// is total, and re-validation mutates nothing but the overlay.
    pub(crate) fn select_for_block(
        &mut self,
        snapshot: &dyn StateReader,
        byte_budget: u64,
        gas_budget: u64,
    ) -> Vec<Transaction> {
        let mut selected = Vec::new();
        let mut remaining_bytes = byte_budget;
        let mut remaining_gas = gas_budget;
        let mut overlay = StateOverlay::new(self.config.scheme, snapshot);
        let mut evict: Vec<TransactionId> = Vec::new();

        for cursor in self.sorted.iter() {
            if remaining_bytes == 0 || remaining_gas == 0 {
                break;
            }
            let entry = self
                .entries
                .get(&cursor.get_id())
                .expect("entry should exist for every sorted cursor");
            if entry.size_bytes > remaining_bytes {
                continue;
            }
            let gas = gas_cost(&entry.transaction);
            if gas > remaining_gas {
                continue;
            }
            match validate_transaction_stateful(
                self.config.scheme,
                &entry.transaction,
                &mut overlay,
            ) {
                Ok(()) => {
                    remaining_bytes -= entry.size_bytes;
                    remaining_gas -= gas;
                    selected.push(entry.transaction.clone());
                }
                Err(kind) if kind.is_permanent() => {
                    debug!("utx evicting {} on permanent failure: {}", cursor.get_id(), kind);
                    evict.push(cursor.get_id());
                }
                Err(_) => {
                    // transient: skip, keep pooled
                }
            }
        }
        for id in evict {
            self.remove_entry(&id);
        }
        selected
    }

    /// Evict aged entries, then trim to the budgets by ascending fee density.
    pub(crate) fn housekeep(&mut self, now: WavesTime) {
        let aged: Vec<TransactionId> = self
            .entries
            .values()
            .filter(|entry| now.saturating_sub(entry.received_at) > self.config.utx_ttl)
            .map(|entry| entry.cursor.get_id())
            .collect();
        for id in &aged {
            self.remove_entry(id);
        }
        if !aged.is_empty() {
            debug!("utx evicted {} aged entries", aged.len());
        }
        while self.entries.len() > self.config.max_utx_count
            || self.total_bytes > self.config.max_utx_bytes
        {
            // the unwrap cannot fail: budgets can only be exceeded while
            // entries remain
            let worst = *self.sorted.iter().next_back().unwrap();
            self.remove_entry(&worst.get_id());
        }
    }

    /// Ids in selection order.
    pub(crate) fn ordered_ids(&self) -> Vec<TransactionId> {
        self.sorted.iter().map(|cursor| cursor.get_id()).collect()
    }

    /// Resource usage.
    pub(crate) fn stats(&self) -> UtxStats {
        UtxStats {
            count: self.entries.len(),
            bytes: self.total_bytes,
        }
    }
}
