// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::pool::UtxPool;
use parking_lot::RwLock;
use std::sync::mpsc::SyncSender;
use std::sync::Arc;
use std::thread::JoinHandle;
use tracing::{info, warn};
use waves_models::transaction::{Transaction, TransactionId};
use waves_state_exports::StateReader;
use waves_time::WavesTime;
use waves_utx_exports::{AdmissionError, UtxController, UtxManager, UtxStats};

/// Commands of the pool write thread.
pub(crate) enum Command {
    /// gossip admissions without a verdict
    AddTransactions(Vec<Transaction>),
    /// stop the thread
    Stop,
}

#[derive(Clone)]
pub(crate) struct UtxControllerImpl {
    pub(crate) pool: Arc<RwLock<UtxPool>>,
    pub(crate) input_sender: SyncSender<Command>,
}

impl UtxController for UtxControllerImpl {
    fn admit(
        &self,
        snapshot: &dyn StateReader,
        transaction: Transaction,
        now: WavesTime,
    ) -> Result<TransactionId, AdmissionError> {
        self.pool.write().admit(snapshot, transaction, now)
    }

    fn add_transactions(&self, transactions: Vec<Transaction>) {
        if transactions.is_empty() {
            return;
        }
        if let Err(err) = self.input_sender.try_send(Command::AddTransactions(transactions)) {
            // back-pressure: gossip is droppable, the sender will rebroadcast
            warn!("utx input queue full, dropping gossip batch: {}", err);
        }
    }

    fn remove(&self, ids: &[TransactionId]) {
        self.pool.write().remove(ids);
    }

    fn select_for_block(
        &self,
        snapshot: &dyn StateReader,
        byte_budget: u64,
        gas_budget: u64,
    ) -> Vec<Transaction> {
        self.pool
            .write()
            .select_for_block(snapshot, byte_budget, gas_budget)
    }

    fn contains(&self, id: &TransactionId) -> bool {
        self.pool.read().contains(id)
    }

    fn ordered_ids(&self) -> Vec<TransactionId> {
        self.pool.read().ordered_ids()
    }

    fn stats(&self) -> UtxStats {
        self.pool.read().stats()
    }

    fn clone_box(&self) -> Box<dyn UtxController> {
        Box::new(self.clone())
    }
}

pub(crate) struct UtxManagerImpl {
    pub(crate) thread_handle: Option<JoinHandle<()>>,
    pub(crate) input_sender: SyncSender<Command>,
}

impl UtxManager for UtxManagerImpl {
    fn stop(&mut self) {
        info!("stopping UTX pool worker...");
        let _ = self.input_sender.send(Command::Stop);
        if let Some(join_handle) = self.thread_handle.take() {
            join_handle
                .join()
                .expect("UTX pool thread panicked on try to join");
        }
        info!("UTX pool worker stopped");
    }
}
