// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::controller::ChainControllerImpl;
use crate::manager::ChainManagerImpl;
use crate::state::ChainState;
use parking_lot::RwLock;
use std::sync::Arc;
use std::thread;
use tracing::warn;
use waves_chain_exports::{
    ChainChannels, ChainCommand, ChainConfig, ChainController, ChainError, ChainManager,
};
use waves_channel::receiver::WavesReceiver;
use waves_channel::WavesChannel;
use waves_state_exports::StateStore;
use waves_time::WavesTime;

/// The applier worker: one thread dequeuing one command at a time.
pub(crate) struct ChainWorker {
    /// Channel to receive commands from the controller
    command_receiver: WavesReceiver<ChainCommand>,
    /// State shared with the controller
    shared_state: Arc<RwLock<ChainState>>,
}

impl ChainWorker {
    /// Execute one command.
    ///
    /// # Returns
    /// If successful, whether the loop should keep running.
    fn manage_command(&mut self, command: ChainCommand) -> Result<bool, ChainError> {
        match command {
            ChainCommand::RegisterBlock { block, origin } => {
                let mut write_shared_state = self.shared_state.write();
                write_shared_state.register_block(block, origin)?;
                Ok(true)
            }
            ChainCommand::Rollback { to_height } => {
                let mut write_shared_state = self.shared_state.write();
                write_shared_state.rollback_to(to_height)?;
                Ok(true)
            }
            ChainCommand::BroadcastTransaction { transaction, reply } => {
                let read_shared_state = self.shared_state.read();
                let snapshot = read_shared_state.store.snapshot();
                let now = WavesTime::now()?;
                let verdict = read_shared_state.channels.utx_controller.admit(
                    snapshot.as_ref(),
                    transaction.clone(),
                    now,
                );
                if verdict.is_ok() {
                    read_shared_state
                        .channels
                        .peer_manager
                        .broadcast_transactions(&[transaction]);
                }
                // the caller may have cancelled and dropped the receiver
                let _ = reply.send(verdict);
                Ok(true)
            }
            ChainCommand::Stop => Ok(false),
        }
    }

    /// Runs in a loop until a stop command or a disconnect.
    pub(crate) fn run(&mut self) {
        loop {
            match self.command_receiver.recv() {
                Ok(command) => match self.manage_command(command) {
                    Ok(true) => continue,
                    Ok(false) => break,
                    Err(err) => {
                        warn!("error in chain worker: {}", err);
                        continue;
                    }
                },
                // channel disconnected (sender dropped) => quit main loop
                Err(_) => break,
            }
        }
    }
}

/// Create a new chain worker thread.
///
/// # Arguments
/// * `config`: chain configuration
/// * `channels`: links to the other modules
/// * `store`: the state store, already holding at least the genesis block
///
/// # Returns
/// * the chain controller shared with the router and the admin surface
/// * the chain manager used to stop the worker thread
pub fn start_chain_controller(
    config: ChainConfig,
    channels: ChainChannels,
    store: Box<dyn StateStore>,
) -> Result<(Box<dyn ChainController>, Box<dyn ChainManager>), ChainError> {
    let (tx, rx) = WavesChannel::new("chain_command".to_string(), Some(config.channel_size));
    let shared_state = Arc::new(RwLock::new(ChainState::new(config, channels, store)?));

    let shared_state_cloned = shared_state.clone();
    let chain_thread = thread::Builder::new()
        .name("chain worker".into())
        .spawn(move || {
            let mut worker = ChainWorker {
                command_receiver: rx,
                shared_state: shared_state_cloned,
            };
            worker.run()
        })
        .expect("can't spawn chain worker thread");

    let manager = ChainManagerImpl {
        chain_thread: Some((tx.clone(), chain_thread)),
    };
    let controller = ChainControllerImpl {
        command_sender: tx,
        shared_state,
    };
    Ok((Box::new(controller), Box::new(manager)))
}
