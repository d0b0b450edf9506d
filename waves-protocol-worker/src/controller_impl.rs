// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crossbeam::channel::bounded;
use std::thread::JoinHandle;
use tracing::info;
use waves_channel::sender::WavesSender;
use waves_models::transaction::Transaction;
use waves_protocol_exports::{
    Message, ProtocolConfig, ProtocolController, ProtocolError, ProtocolManager,
};

/// Commands of the router thread.
#[derive(Clone)]
pub(crate) enum RouterCommand {
    /// an inbound message to demultiplex
    Message(Box<Message>),
    /// stop the thread
    Stop,
}

#[derive(Clone)]
pub(crate) struct ProtocolControllerImpl {
    pub(crate) config: ProtocolConfig,
    pub(crate) command_sender: WavesSender<RouterCommand>,
}

impl ProtocolController for ProtocolControllerImpl {
    fn notify(&self, message: Message) -> Result<(), ProtocolError> {
        self.command_sender
            .try_send(RouterCommand::Message(Box::new(message)))
            .map_err(|_| ProtocolError::QueueFull)
    }

    fn admin_broadcast(
        &self,
        api_key: &str,
        payload: &[u8],
    ) -> Result<Transaction, ProtocolError> {
        let (reply_tx, reply_rx) = bounded(1);
        self.notify(Message::AdminBroadcastTransaction {
            api_key: api_key.to_string(),
            payload: payload.to_vec(),
            reply: reply_tx,
        })?;
        match reply_rx.recv_timeout(self.config.admin_broadcast_timeout.to_duration()) {
            Ok(verdict) => verdict,
            // the router itself enforces the same deadline; whichever side
            // fires first, the caller sees a timeout
            Err(_) => Err(ProtocolError::Timeout),
        }
    }

    fn clone_box(&self) -> Box<dyn ProtocolController> {
        Box::new(self.clone())
    }
}

pub(crate) struct ProtocolManagerImpl {
    pub(crate) command_sender: WavesSender<RouterCommand>,
    pub(crate) thread_handle: Option<JoinHandle<()>>,
}

impl ProtocolManager for ProtocolManagerImpl {
    fn stop(&mut self) {
        info!("stopping protocol router...");
        let _ = self.command_sender.send(RouterCommand::Stop);
        if let Some(join_handle) = self.thread_handle.take() {
            join_handle
                .join()
                .expect("protocol router thread panicked on try to join");
        }
        info!("protocol router stopped");
    }
}
