// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::AdmissionError;
use waves_models::transaction::{Transaction, TransactionId};
use waves_state_exports::StateReader;
use waves_time::WavesTime;

/// Resource usage of the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UtxStats {
    /// pooled entry count
    pub count: usize,
    /// pooled serialized bytes
    pub bytes: u64,
}

/// Interface that communicates with the UTX pool worker.
///
/// Snapshot handles are always passed in by the caller (the applier), never
/// stored, so admission reflects exactly the commits that linearized before
/// it.
pub trait UtxController: Send + Sync {
    /// Admit one transaction with a synchronous verdict. Idempotent: a second
    /// admission of the same id returns `AlreadyKnown` without state change.
    fn admit(
        &self,
        snapshot: &dyn StateReader,
        transaction: Transaction,
        now: WavesTime,
    ) -> Result<TransactionId, AdmissionError>;

    /// Queue gossiped transactions for admission without a verdict.
    fn add_transactions(&self, transactions: Vec<Transaction>);

    /// Drop entries by id, used by the applier after a commit.
    fn remove(&self, ids: &[TransactionId]);

    /// Select an ordered candidate list for block production. Entries are
    /// re-validated against the running snapshot; permanently invalid ones
    /// are evicted, transiently invalid ones only skipped.
    fn select_for_block(
        &self,
        snapshot: &dyn StateReader,
        byte_budget: u64,
        gas_budget: u64,
    ) -> Vec<Transaction>;

    /// Whether an entry with this id is pooled.
    fn contains(&self, id: &TransactionId) -> bool;

    /// Ids in selection order, copied under a short lock for admin queries.
    fn ordered_ids(&self) -> Vec<TransactionId>;

    /// Pool resource usage.
    fn stats(&self) -> UtxStats;

    /// Returns a boxed clone of self, to allow cloning `Box<dyn UtxController>`.
    fn clone_box(&self) -> Box<dyn UtxController>;
}

impl Clone for Box<dyn UtxController> {
    fn clone(&self) -> Box<dyn UtxController> {
        self.clone_box()
    }
}

/// UTX manager used to stop the pool worker thread.
pub trait UtxManager {
    /// Stop the worker thread.
    fn stop(&mut self);
}
