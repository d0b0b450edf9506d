use std::ops::Deref;

use crossbeam::channel::{SendError, Sender, TrySendError};
use prometheus::Gauge;

#[derive(Clone, Debug)]
pub struct WavesSender<T> {
    pub(crate) sender: Sender<T>,
    #[allow(dead_code)]
    pub(crate) name: String,
    /// channel size
    pub(crate) actual_len: Gauge,
}

impl<T> WavesSender<T> {
    /// Send a message to the channel, blocking while the channel is full.
    pub fn send(&self, msg: T) -> Result<(), SendError<T>> {
        match self.sender.send(msg) {
            Ok(()) => {
                self.actual_len.inc();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Send a message without blocking, failing when the channel is full.
    pub fn try_send(&self, msg: T) -> Result<(), TrySendError<T>> {
        match self.sender.try_send(msg) {
            Ok(()) => {
                self.actual_len.inc();
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl<T> Deref for WavesSender<T> {
    type Target = Sender<T>;

    fn deref(&self) -> &Self::Target {
        &self.sender
    }
}
