//! Waves channel is a crossbeam channel wrapper with prometheus metrics
//! exposed for each channel:
//! - actual length of channel (inc() when sending msg, dec() when receiving)
//! - total received messages (inc() when receiving)
//!
//! # Example
//! ```
//! use waves_channel::WavesChannel;
//! let (sender, receiver) = WavesChannel::new::<String>("doc".to_string(), None);
//! ```
//!
//! # Warning
//! Care about using WavesReceiver with the select! macro:
//! select! does not call recv() so metrics will not be updated,
//! call `your_receiver.inc_metrics()` manually.

use std::sync::Arc;

use receiver::WavesReceiver;
use sender::WavesSender;
use tracing::debug;

pub mod receiver;
pub mod sender;

#[derive(Clone)]
pub struct WavesChannel {}

impl WavesChannel {
    #[allow(clippy::new_ret_no_self)]
    pub fn new<T>(name: String, capacity: Option<usize>) -> (WavesSender<T>, WavesReceiver<T>) {
        use prometheus::{Counter, Gauge};

        let (s, r) = if let Some(capacity) = capacity {
            crossbeam::channel::bounded::<T>(capacity)
        } else {
            crossbeam::channel::unbounded::<T>()
        };

        let actual_len = Gauge::new(
            format!("{}_channel_actual_size", name),
            "Actual length of channel",
        )
        .expect("Failed to create gauge");

        let received = Counter::new(
            format!("{}_channel_total_receive", name),
            "Total received messages",
        )
        .expect("Failed to create counter");

        // error here if metrics already registered (several channels sharing a name)
        if let Err(e) = prometheus::register(Box::new(actual_len.clone())) {
            debug!("Failed to register actual_len gauge for {} : {}", name, e);
        }

        if let Err(e) = prometheus::register(Box::new(received.clone())) {
            debug!("Failed to register received counter for {} : {}", name, e);
        }

        let sender = WavesSender {
            sender: s,
            name: name.clone(),
            actual_len: actual_len.clone(),
        };

        let receiver = WavesReceiver {
            receiver: r,
            name,
            actual_len,
            received,
            ref_counter: Arc::new(()),
        };

        (sender, receiver)
    }
}
