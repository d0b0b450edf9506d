// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info};
use waves_feed_exports::{
    BlockInfoRecord, FeedConfig, FeedCursor, FeedError, FeedRecord, L2ContractDataEntriesRecord,
    RollbackRecord,
};
use waves_models::block_id::BlockId;
use waves_state_exports::StateStore;

/// Everything the feed knows, behind one mutex and one condvar.
///
/// The condvar carries two waits: publishers sleeping on a full ack window
/// and subscriber `next` calls sleeping on an empty buffer.
pub(crate) struct FeedShared {
    pub mutex: Mutex<FeedState>,
    pub condvar: Condvar,
}

pub(crate) struct FeedState {
    pub config: FeedConfig,
    pub store: Box<dyn StateStore>,
    /// durable resumption anchor, `None` until the first ack
    pub cursor: Option<FeedCursor>,
    /// undelivered records in strict delivery order
    pub buffer: VecDeque<FeedRecord>,
    /// height of the highest buffered or delivered `BlockInfo`
    pub highest_block_height: u64,
    /// height the ack window is measured from
    pub last_acked_height: u64,
    /// bumped on every subscribe; stale sessions observe it and die
    pub session_epoch: u64,
    /// the worker is shutting down
    pub stopped: bool,
}

impl FeedState {
    pub(crate) fn new(config: FeedConfig, store: Box<dyn StateStore>) -> Result<Self, FeedError> {
        let cursor = FeedCursor::load(&config.cursor_path)?;
        if let Some(cursor) = &cursor {
            info!(
                "feed resuming from durable cursor at height {}",
                cursor.last_delivered_height
            );
        }
        let last_acked_height = cursor.map(|c| c.last_delivered_height).unwrap_or(0);
        Ok(FeedState {
            config,
            store,
            cursor,
            buffer: VecDeque::new(),
            highest_block_height: last_acked_height,
            last_acked_height,
            session_epoch: 0,
            stopped: false,
        })
    }

    /// How many blocks the buffer sits past the last acknowledged one.
    pub(crate) fn blocks_ahead(&self) -> u64 {
        self.highest_block_height
            .saturating_sub(self.last_acked_height)
    }

    /// Append records, tracking the window high-water mark.
    pub(crate) fn append(&mut self, records: Vec<FeedRecord>) {
        for record in records {
            if let FeedRecord::BlockInfo(block_info) = &record {
                self.highest_block_height = self.highest_block_height.max(block_info.height);
            }
            self.buffer.push_back(record);
        }
    }

    /// Rebuild the session buffer from committed state.
    ///
    /// Returns the session epoch of the fresh subscription.
    pub(crate) fn rebuild_for_subscribe(
        &mut self,
        from_height: u64,
        from_block_id: Option<BlockId>,
    ) -> Result<u64, FeedError> {
        let snapshot = self.store.snapshot();
        let (tip_height, _) = snapshot
            .tip()
            .ok_or_else(|| FeedError::UnknownResumePoint("empty state store".into()))?;
        if from_height > tip_height {
            return Err(FeedError::UnknownResumePoint(format!(
                "height {} is past the tip {}",
                from_height, tip_height
            )));
        }

        let mut rollbacks: Vec<FeedRecord> = Vec::new();
        let start_height = match from_block_id {
            None => from_height + 1,
            Some(claimed) => {
                let canonical = snapshot
                    .block_at_height(from_height)
                    .ok_or_else(|| {
                        FeedError::UnknownResumePoint(format!("no block at {}", from_height))
                    })?;
                if canonical.id == claimed {
                    from_height + 1
                } else {
                    // the subscriber sits on a stale fork. Rewind to the
                    // deepest safe point: the last acknowledged block still
                    // canonical, else genesis. Over-rewinding is harmless
                    // under idempotent (height, block_id) delivery.
                    let safe_height = self
                        .cursor
                        .filter(|cursor| {
                            snapshot
                                .block_at_height(cursor.last_delivered_height)
                                .map(|block| block.id == cursor.last_delivered_block_id)
                                .unwrap_or(false)
                        })
                        .map(|cursor| cursor.last_delivered_height.min(from_height))
                        .unwrap_or(1);
                    debug!(
                        "stale subscriber at {}: rewinding to {}",
                        from_height, safe_height
                    );
                    for height in (safe_height..from_height).rev() {
                        rollbacks.push(FeedRecord::Rollback(RollbackRecord { height }));
                    }
                    safe_height + 1
                }
            }
        };

        self.buffer.clear();
        self.buffer.extend(rollbacks);
        for height in start_height..=tip_height {
            let block = snapshot.block_at_height(height).ok_or_else(|| {
                FeedError::UnknownResumePoint(format!("no block at {}", height))
            })?;
            let data_writes = snapshot.data_entries_at_height(height);
            self.buffer
                .push_back(FeedRecord::BlockInfo(BlockInfoRecord::from_block(&block)));
            self.buffer.push_back(FeedRecord::DataEntries(
                L2ContractDataEntriesRecord::from_block_data(height, &block.id, &data_writes),
            ));
        }
        self.highest_block_height = tip_height.max(start_height.saturating_sub(1));
        self.last_acked_height = start_height - 1;
        self.session_epoch += 1;
        Ok(self.session_epoch)
    }

    /// Validate and persist an acknowledgement.
    pub(crate) fn ack(&mut self, height: u64, block_id: BlockId) -> Result<(), FeedError> {
        let snapshot = self.store.snapshot();
        let canonical = snapshot
            .block_at_height(height)
            .ok_or_else(|| FeedError::BadAck(format!("no canonical block at {}", height)))?;
        if canonical.id != block_id {
            return Err(FeedError::BadAck(format!(
                "block {} is not canonical at {}",
                block_id, height
            )));
        }
        let cursor = FeedCursor {
            last_delivered_height: height,
            last_delivered_block_id: block_id,
        };
        cursor.store(&self.config.cursor_path)?;
        self.cursor = Some(cursor);
        self.last_acked_height = self.last_acked_height.max(height);
        Ok(())
    }
}

pub(crate) type SharedFeedState = Arc<FeedShared>;
