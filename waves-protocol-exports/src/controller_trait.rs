// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::ProtocolError;
use crate::messages::Message;
use waves_models::transaction::Transaction;

/// Interface that communicates with the router worker.
pub trait ProtocolController: Send + Sync {
    /// Queue an inbound message for demultiplexing. Fails with `QueueFull`
    /// instead of blocking.
    fn notify(&self, message: Message) -> Result<(), ProtocolError>;

    /// Authenticate, decode and broadcast a self-describing JSON transaction
    /// payload, waiting for the verdict under the fixed deadline.
    ///
    /// On acceptance the decoded transaction comes back; otherwise one of
    /// `BadRequest`, `AuthFailed`, `Timeout` or `InternalError`.
    fn admin_broadcast(&self, api_key: &str, payload: &[u8])
        -> Result<Transaction, ProtocolError>;

    /// Returns a boxed clone of self, to allow cloning `Box<dyn ProtocolController>`.
    fn clone_box(&self) -> Box<dyn ProtocolController>;
}

impl Clone for Box<dyn ProtocolController> {
    fn clone(&self) -> Box<dyn ProtocolController> {
        self.clone_box()
    }
}

/// Protocol manager used to stop the router thread.
pub trait ProtocolManager {
    /// Stop the router thread.
    fn stop(&mut self);
}
