// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::controller_impl::{ProtocolControllerImpl, ProtocolManagerImpl, RouterCommand};
use crossbeam::channel::bounded;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use waves_chain_exports::{BlockGraphStatus, BlockOrigin, ChainController, ChainError};
use waves_channel::receiver::WavesReceiver;
use waves_channel::WavesChannel;
use waves_hash::Hash;
use waves_models::block::Microblock;
use waves_models::transaction::Transaction;
use waves_protocol_exports::{
    Message, PeerManager, ProtocolConfig, ProtocolController, ProtocolError, ProtocolManager,
};
use waves_utx_exports::UtxController;

/// The router worker: one thread demultiplexing inbound messages.
pub(crate) struct RouterWorker {
    config: ProtocolConfig,
    command_receiver: WavesReceiver<RouterCommand>,
    chain_controller: Box<dyn ChainController>,
    utx_controller: Box<dyn UtxController>,
    peer_manager: Box<dyn PeerManager>,
    /// digest of the configured admin API key, `None` when disabled
    api_key_hash: Option<Hash>,
}

impl RouterWorker {
    fn check_auth(&self, presented: &str) -> Result<(), ProtocolError> {
        match &self.api_key_hash {
            // with no key configured every admin call is rejected
            None => Err(ProtocolError::AuthFailed),
            Some(expected) => {
                if Hash::compute_from(presented.as_bytes()) == *expected {
                    Ok(())
                } else {
                    Err(ProtocolError::AuthFailed)
                }
            }
        }
    }

    fn handle_admin_broadcast(
        &self,
        api_key: String,
        payload: Vec<u8>,
    ) -> Result<Transaction, ProtocolError> {
        let deadline = Instant::now() + self.config.admin_broadcast_timeout.to_duration();
        self.check_auth(&api_key)?;
        let transaction = Transaction::from_json(&payload)
            .map_err(|err| ProtocolError::BadRequest(err.to_string()))?;
        if transaction.chain_id() != self.config.scheme.to_byte() {
            return Err(ProtocolError::BadRequest(format!(
                "wrong chain id {}",
                transaction.chain_id()
            )));
        }

        let (verdict_tx, verdict_rx) = bounded(1);
        let remaining = deadline.saturating_duration_since(Instant::now());
        match self
            .chain_controller
            .broadcast_transaction(transaction.clone(), verdict_tx, remaining)
        {
            Ok(()) => {}
            // a stalled applier queue surfaces as a timeout, and the
            // transaction is neither pooled nor on chain
            Err(ChainError::QueueFull) => return Err(ProtocolError::Timeout),
            Err(err) => return Err(ProtocolError::InternalError(err.to_string())),
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        match verdict_rx.recv_timeout(remaining.max(Duration::from_millis(1))) {
            Ok(Ok(_id)) => Ok(transaction),
            Ok(Err(admission)) => Err(ProtocolError::BadRequest(admission.to_string())),
            Err(crossbeam::channel::RecvTimeoutError::Timeout) => Err(ProtocolError::Timeout),
            Err(crossbeam::channel::RecvTimeoutError::Disconnected) => Err(
                ProtocolError::InternalError("applier dropped the verdict channel".into()),
            ),
        }
    }

    fn handle_microblock(&self, microblock: Microblock) {
        if let Err(err) = microblock.verify_signature() {
            debug!("dropping microblock with bad signature: {}", err);
            return;
        }
        let (_, tip_id) = self.chain_controller.get_tip();
        if microblock.reference != tip_id {
            // stale: it extends a tip we already moved past
            debug!(
                "dropping microblock referencing {} while the tip is {}",
                microblock.reference, tip_id
            );
            return;
        }
        // candidate transactions for the next key block
        self.utx_controller
            .add_transactions(microblock.transactions);
    }

    fn manage_message(&self, message: Message) {
        waves_logging::waves_trace!("protocol.message", {
            "category": format!("{:?}", message.category())
        });
        match message {
            Message::BlockAnnouncement(block_id) => {
                let status = self
                    .chain_controller
                    .get_block_statuses(&[block_id])
                    .pop()
                    .unwrap_or(BlockGraphStatus::Unknown);
                if status == BlockGraphStatus::Unknown {
                    self.peer_manager.request_block(block_id);
                }
            }
            Message::BlockBody(block) => {
                match self
                    .chain_controller
                    .register_block(block, BlockOrigin::Peer)
                {
                    Ok(()) => {}
                    Err(ChainError::QueueFull) => {
                        // peers re-announce; dropping here is the back-pressure
                        debug!("applier queue full, dropping peer block");
                    }
                    Err(err) => warn!("failed to register peer block: {}", err),
                }
            }
            Message::TransactionBroadcast(transactions) => {
                self.utx_controller.add_transactions(transactions);
            }
            Message::Microblock(microblock) => self.handle_microblock(microblock),
            Message::AdminBroadcastTransaction {
                api_key,
                payload,
                reply,
            } => {
                let verdict = self.handle_admin_broadcast(api_key, payload);
                // the caller may have given up already
                let _ = reply.send(verdict);
            }
        }
    }

    fn run(&mut self) {
        loop {
            match self.command_receiver.recv() {
                Ok(RouterCommand::Message(message)) => self.manage_message(*message),
                Ok(RouterCommand::Stop) => break,
                Err(_) => break,
            }
        }
    }
}

/// Start the message router.
///
/// # Returns
/// * the controller handed to the peer manager and the admin surface
/// * the manager used to stop the router thread
pub fn start_protocol_controller(
    config: ProtocolConfig,
    chain_controller: Box<dyn ChainController>,
    utx_controller: Box<dyn UtxController>,
    peer_manager: Box<dyn PeerManager>,
) -> (Box<dyn ProtocolController>, Box<dyn ProtocolManager>) {
    let (tx, rx) = WavesChannel::new("protocol_command".to_string(), Some(config.channel_size));
    let api_key_hash = if config.api_key.is_empty() {
        None
    } else {
        Some(Hash::compute_from(config.api_key.as_bytes()))
    };
    let worker_config = config.clone();
    let router_thread = thread::Builder::new()
        .name("protocol router".into())
        .spawn(move || {
            let mut worker = RouterWorker {
                config: worker_config,
                command_receiver: rx,
                chain_controller,
                utx_controller,
                peer_manager,
                api_key_hash,
            };
            worker.run()
        })
        .expect("can't spawn protocol router thread");

    let controller = ProtocolControllerImpl {
        config,
        command_sender: tx.clone(),
    };
    let manager = ProtocolManagerImpl {
        command_sender: tx,
        thread_handle: Some(router_thread),
    };
    (Box::new(controller), Box::new(manager))
}
