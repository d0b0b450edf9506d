// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

//! Write worker for the UTX pool, allowing asynchronous gossip admissions
//! and periodic housekeeping.

use crate::controller_impl::{Command, UtxControllerImpl, UtxManagerImpl};
use crate::pool::UtxPool;
use parking_lot::RwLock;
use std::sync::mpsc::{sync_channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use tracing::warn;
use waves_state_exports::StateStore;
use waves_time::WavesTime;
use waves_utx_exports::{UtxConfig, UtxController, UtxManager};

/// UTX pool write thread instance
pub(crate) struct UtxPoolThread {
    /// Command reception channel
    receiver: Receiver<Command>,
    /// Shared reference to the pool
    pool: Arc<RwLock<UtxPool>>,
    /// Snapshot source for gossip admissions
    state_store: Box<dyn StateStore>,
}

impl UtxPoolThread {
    /// Spawns a pool writer thread, returning a join handle.
    pub(crate) fn spawn(
        receiver: Receiver<Command>,
        pool: Arc<RwLock<UtxPool>>,
        state_store: Box<dyn StateStore>,
        config: UtxConfig,
    ) -> JoinHandle<()> {
        let thread_builder = thread::Builder::new().name("utx-pool".into());
        thread_builder
            .spawn(move || {
                let this = Self {
                    receiver,
                    pool,
                    state_store,
                };
                this.run(config)
            })
            .expect("failed to spawn thread: utx-pool")
    }

    /// Runs the thread.
    fn run(self, config: UtxConfig) {
        let tick = config.housekeep_interval.to_duration();
        loop {
            match self.receiver.recv_timeout(tick) {
                Ok(Command::Stop) => break,
                Ok(Command::AddTransactions(transactions)) => {
                    let now = match WavesTime::now() {
                        Ok(now) => now,
                        Err(err) => {
                            warn!("utx worker could not read the clock: {}", err);
                            continue;
                        }
                    };
                    let snapshot = self.state_store.snapshot();
                    let mut pool = self.pool.write();
                    for transaction in transactions {
                        // gossip has no reply channel: verdicts are dropped
                        if let Err(err) = pool.admit(snapshot.as_ref(), transaction, now) {
                            tracing::trace!("gossip admission rejected: {}", err);
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    if let Ok(now) = WavesTime::now() {
                        self.pool.write().housekeep(now);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }
}

/// Start the UTX pool worker.
///
/// # Returns
/// * the manager used to stop the worker thread
/// * the controller shared with the applier and the router
pub fn start_utx_controller(
    config: UtxConfig,
    state_store: Box<dyn StateStore>,
) -> (Box<dyn UtxManager>, Box<dyn UtxController>) {
    let (input_sender, input_receiver) = sync_channel(config.channel_size);
    let pool = Arc::new(RwLock::new(UtxPool::init(config)));

    let thread_handle = UtxPoolThread::spawn(
        input_receiver,
        pool.clone(),
        state_store,
        config,
    );

    let controller = UtxControllerImpl {
        pool,
        input_sender: input_sender.clone(),
    };
    let manager = UtxManagerImpl {
        thread_handle: Some(thread_handle),
        input_sender,
    };
    (Box::new(manager), Box::new(controller))
}
