use std::{
    ops::{Deref, DerefMut},
    sync::Arc,
    time::Duration,
};

use crossbeam::channel::{Receiver, RecvError, RecvTimeoutError, TryRecvError};
use prometheus::{Counter, Gauge};

#[derive(Clone)]
pub struct WavesReceiver<T> {
    pub(crate) receiver: Receiver<T>,
    pub(crate) name: String,
    /// channel size
    pub(crate) actual_len: Gauge,
    /// total received messages
    pub(crate) received: Counter,
    /// reference counter to know how many receivers are cloned
    pub(crate) ref_counter: Arc<()>,
}

impl<T> Drop for WavesReceiver<T> {
    fn drop(&mut self) {
        let ref_count = Arc::strong_count(&self.ref_counter);
        if ref_count == 1 {
            // last ref, unregister the metrics
            let _ = prometheus::unregister(Box::new(self.actual_len.clone()));
            let _ = prometheus::unregister(Box::new(self.received.clone()));
        }
    }
}

impl<T> WavesReceiver<T> {
    /// Increment the metrics manually.
    /// Needed when the receiver is polled through select!, which bypasses recv().
    pub fn inc_metrics(&self) {
        // use the len of the channel instead of actual_len.dec() because
        // a single send may be observed by several recv attempts
        self.actual_len.set(self.receiver.len() as f64);
        self.received.inc();
    }

    /// Attempt to receive a message from the channel without blocking.
    pub fn try_recv(&self) -> Result<T, TryRecvError> {
        match self.receiver.try_recv() {
            Ok(msg) => {
                self.inc_metrics();
                Ok(msg)
            }
            Err(TryRecvError::Empty) => Err(TryRecvError::Empty),
            Err(TryRecvError::Disconnected) => {
                let _ = prometheus::unregister(Box::new(self.actual_len.clone()));
                let _ = prometheus::unregister(Box::new(self.received.clone()));
                Err(TryRecvError::Disconnected)
            }
        }
    }

    /// Receive a message, blocking until one is available.
    pub fn recv(&self) -> Result<T, RecvError> {
        match self.receiver.recv() {
            Ok(msg) => {
                self.inc_metrics();
                Ok(msg)
            }
            Err(e) => {
                let _ = prometheus::unregister(Box::new(self.actual_len.clone()));
                let _ = prometheus::unregister(Box::new(self.received.clone()));
                Err(e)
            }
        }
    }

    /// Receive a message, blocking at most `timeout`.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<T, RecvTimeoutError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(msg) => {
                self.inc_metrics();
                Ok(msg)
            }
            Err(e) => Err(e),
        }
    }
}

impl<T> Deref for WavesReceiver<T> {
    type Target = Receiver<T>;

    fn deref(&self) -> &Self::Target {
        &self.receiver
    }
}

impl<T> DerefMut for WavesReceiver<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.receiver
    }
}
