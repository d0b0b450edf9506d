// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::state::SharedFeedState;
use std::time::{Duration, Instant};
use tracing::info;
use waves_feed_exports::{
    FeedController, FeedError, FeedManager, FeedRecord, FeedSink, FeedSubscription,
};
use waves_models::block_id::BlockId;

/// Applier-facing sink: blocking, ordered, window-bounded.
#[derive(Clone)]
pub(crate) struct FeedSinkImpl {
    pub(crate) shared: SharedFeedState,
}

impl FeedSink for FeedSinkImpl {
    fn publish(&self, records: Vec<FeedRecord>) -> Result<(), FeedError> {
        let mut state = self.shared.mutex.lock();
        let ack_window = state.config.ack_window;
        // suspend while the buffer sits a full window past the last ack;
        // this is what slows the applier down
        self.shared
            .condvar
            .wait_while(&mut state, |state| {
                !state.stopped && state.blocks_ahead() >= ack_window
            });
        if state.stopped {
            return Err(FeedError::Disconnected);
        }
        state.append(records);
        self.shared.condvar.notify_all();
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn FeedSink> {
        Box::new(self.clone())
    }
}

/// Subscriber-facing controller.
#[derive(Clone)]
pub(crate) struct FeedControllerImpl {
    pub(crate) shared: SharedFeedState,
}

impl FeedController for FeedControllerImpl {
    fn subscribe(
        &self,
        from_height: u64,
        from_block_id: Option<BlockId>,
    ) -> Result<Box<dyn FeedSubscription>, FeedError> {
        let mut state = self.shared.mutex.lock();
        if state.stopped {
            return Err(FeedError::Disconnected);
        }
        let epoch = state.rebuild_for_subscribe(from_height, from_block_id)?;
        // a replaced session blocked in next() must observe the new epoch
        self.shared.condvar.notify_all();
        Ok(Box::new(FeedSubscriptionImpl {
            shared: self.shared.clone(),
            epoch,
        }))
    }

    fn clone_box(&self) -> Box<dyn FeedController> {
        Box::new(self.clone())
    }
}

/// One subscriber session, invalidated when another subscribe happens.
pub(crate) struct FeedSubscriptionImpl {
    pub(crate) shared: SharedFeedState,
    pub(crate) epoch: u64,
}

impl FeedSubscription for FeedSubscriptionImpl {
    fn next(&mut self, max_batch: usize, timeout: Duration) -> Result<Vec<FeedRecord>, FeedError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.mutex.lock();
        loop {
            if state.stopped {
                return Err(FeedError::Disconnected);
            }
            if state.session_epoch != self.epoch {
                return Err(FeedError::AlreadySubscribed);
            }
            if !state.buffer.is_empty() {
                let take = max_batch.min(state.buffer.len());
                let records: Vec<FeedRecord> = state.buffer.drain(..take).collect();
                return Ok(records);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(FeedError::Cancelled);
            }
            let result = self
                .shared
                .condvar
                .wait_until(&mut state, deadline);
            if result.timed_out() && state.buffer.is_empty() {
                return Err(FeedError::Cancelled);
            }
        }
    }

    fn ack(&mut self, height: u64, block_id: BlockId) -> Result<(), FeedError> {
        let mut state = self.shared.mutex.lock();
        if state.stopped {
            return Err(FeedError::Disconnected);
        }
        if state.session_epoch != self.epoch {
            return Err(FeedError::AlreadySubscribed);
        }
        state.ack(height, block_id)?;
        // a publisher may be sleeping on the window
        self.shared.condvar.notify_all();
        Ok(())
    }
}

/// Feed manager: marks the state stopped and wakes every waiter.
pub(crate) struct FeedManagerImpl {
    pub(crate) shared: SharedFeedState,
}

impl FeedManager for FeedManagerImpl {
    fn stop(&mut self) {
        info!("stopping L2 feed...");
        self.shared.mutex.lock().stopped = true;
        self.shared.condvar.notify_all();
        info!("L2 feed stopped");
    }
}
