// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use waves_models::config::{CHANNEL_SIZE, FEED_ACK_WINDOW};

/// L2 feed configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FeedConfig {
    /// how many blocks past the last acknowledged one the feed may buffer
    /// before back-pressuring the applier
    pub ack_window: u64,
    /// capacity of the worker command queue
    pub channel_size: usize,
    /// where the durable cursor lives
    pub cursor_path: PathBuf,
}

impl FeedConfig {
    /// Default configuration rooted at the given storage directory.
    pub fn with_storage_dir(storage_dir: PathBuf) -> Self {
        FeedConfig {
            ack_window: FEED_ACK_WINDOW,
            channel_size: CHANNEL_SIZE,
            cursor_path: storage_dir.join("l2_feed_cursor.json"),
        }
    }
}
