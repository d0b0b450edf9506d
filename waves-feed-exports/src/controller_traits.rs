// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::FeedError;
use crate::records::FeedRecord;
use std::time::Duration;
use waves_models::block_id::BlockId;

/// The applier-facing side of the feed.
///
/// `publish` blocks while the feed buffer sits `ack_window` blocks past the
/// last acknowledged height; that blocking is the back-pressure that slows
/// the applier command queue and, behind it, peer ingest.
pub trait FeedSink: Send + Sync {
    /// Append records in strict delivery order.
    fn publish(&self, records: Vec<FeedRecord>) -> Result<(), FeedError>;

    /// Returns a boxed clone of self, to allow cloning `Box<dyn FeedSink>`.
    fn clone_box(&self) -> Box<dyn FeedSink>;
}

impl Clone for Box<dyn FeedSink> {
    fn clone(&self) -> Box<dyn FeedSink> {
        self.clone_box()
    }
}

/// The subscriber-facing side of the feed.
pub trait FeedController: Send + Sync {
    /// Open a cursor. With a matching `from_block_id` streaming starts at
    /// `from_height + 1`; on a stale fork the session first replays
    /// `Rollback` records down to the latest common ancestor.
    fn subscribe(
        &self,
        from_height: u64,
        from_block_id: Option<BlockId>,
    ) -> Result<Box<dyn FeedSubscription>, FeedError>;

    /// Returns a boxed clone of self, to allow cloning `Box<dyn FeedController>`.
    fn clone_box(&self) -> Box<dyn FeedController>;
}

impl Clone for Box<dyn FeedController> {
    fn clone(&self) -> Box<dyn FeedController> {
        self.clone_box()
    }
}

/// One open subscriber session. Dropping the session cancels it.
pub trait FeedSubscription: Send {
    /// Up to `max_batch` records in strict height order. Suspends until at
    /// least one record is available or `timeout` elapses (`Cancelled`).
    fn next(&mut self, max_batch: usize, timeout: Duration) -> Result<Vec<FeedRecord>, FeedError>;

    /// Persist the cursor; delivery is at-least-once, so everything past the
    /// acknowledged pair may be re-delivered verbatim after a crash.
    fn ack(&mut self, height: u64, block_id: BlockId) -> Result<(), FeedError>;
}

/// Feed manager used to stop the feed worker thread.
pub trait FeedManager {
    /// Stop the worker thread.
    fn stop(&mut self);
}
