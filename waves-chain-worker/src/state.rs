// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Shared state of the chain worker and the apply algorithm itself.
//!
//! All mutation happens on the worker thread; the controller only takes the
//! read side of the lock for queries.

use crate::graph::ForkDag;
use crate::orphans::OrphanBuffer;
use tracing::{debug, error, info, warn};
use waves_chain_exports::{
    BlockGraphStatus, BlockOrigin, ChainChannels, ChainConfig, ChainError, ChainEvent,
};
use waves_feed_exports::{
    BlockInfoRecord, FeedRecord, L2ContractDataEntriesRecord, RollbackRecord,
};
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_state_exports::{BlockDiff, StateStore};
use waves_time::WavesTime;
use waves_validator::validate_block;

pub(crate) struct ChainState {
    pub config: ChainConfig,
    pub channels: ChainChannels,
    pub store: Box<dyn StateStore>,
    pub dag: ForkDag,
    pub orphans: OrphanBuffer,
}

impl ChainState {
    pub(crate) fn new(
        config: ChainConfig,
        channels: ChainChannels,
        store: Box<dyn StateStore>,
    ) -> Result<Self, ChainError> {
        let snapshot = store.snapshot();
        let (tip_height, _) = snapshot
            .tip()
            .ok_or_else(|| ChainError::ContainerInconsistency("empty state store".into()))?;
        let genesis = snapshot
            .block_at_height(tip_height)
            .ok_or_else(|| ChainError::ContainerInconsistency("missing tip block".into()))?;
        // the graph is rebuilt from the committed tip on start; deeper
        // history is not reorganizable anyway
        let dag = ForkDag::new(&genesis, config.max_rollback);
        Ok(ChainState {
            orphans: OrphanBuffer::new(config.orphan_buffer_capacity),
            dag,
            config,
            channels,
            store,
        })
    }

    /// Register a candidate block, park it if its parent is missing, then
    /// re-run fork choice.
    pub(crate) fn register_block(
        &mut self,
        block: Block,
        origin: BlockOrigin,
    ) -> Result<(), ChainError> {
        waves_logging::waves_trace!("chain.register_block", {
            "block": block.id.to_string(),
            "height": block.header.height
        });
        // cheap local checks before the block enters any container
        if let Err(err) = block.verify_signature() {
            warn!("rejecting block {} with bad signature: {}", block.id, err);
            return Err(ChainError::ModelsError(err));
        }

        let mut worklist = vec![block];
        while let Some(block) = worklist.pop() {
            let id = block.id;
            if self.dag.contains(&id) {
                debug!("block {} already known", id);
                continue;
            }
            match self.dag.insert(block.clone()) {
                Ok(_) => {
                    // adopted orphans whose parent just arrived
                    worklist.extend(self.orphans.take_children(&id));
                }
                Err(ChainError::ParentUnknown) => {
                    if origin == BlockOrigin::Peer {
                        debug!(
                            "parking block {} waiting for parent {} ({} parked)",
                            id,
                            block.header.parent_id,
                            self.orphans.len()
                        );
                        self.channels
                            .peer_manager
                            .request_block(block.header.parent_id);
                        self.orphans.push(block);
                        continue;
                    }
                    return Err(ChainError::ParentUnknown);
                }
                Err(err) => return Err(err),
            }
        }
        self.update_best_chain()
    }

    /// Re-run fork choice and apply the best chain if it moved.
    ///
    /// Invalid candidates are marked in the graph (poisoning their
    /// descendants) and the next best branch is tried, so a bad block never
    /// wedges the applier.
    pub(crate) fn update_best_chain(&mut self) -> Result<(), ChainError> {
        loop {
            let best = self.dag.best_tip();
            if best == self.dag.committed_tip().1 {
                return Ok(());
            }
            let (depth, forward) = match self.dag.path_from_committed(best) {
                Ok(path) => path,
                Err(ChainError::RollbackTooDeep { depth, max }) => {
                    warn!(
                        "rejecting branch at {}: rollback depth {} exceeds {}",
                        best, depth, max
                    );
                    self.dag.mark_invalid(best);
                    continue;
                }
                Err(err) => return Err(err),
            };
            if forward.is_empty() {
                // the best chain still ends at the committed tip
                return Ok(());
            }
            match self.try_apply(depth, &forward) {
                Ok(()) => return Ok(()),
                Err(invalid_id) => {
                    self.dag.mark_invalid(invalid_id);
                    // loop and try the next best branch
                }
            }
        }
    }

    /// Roll back `depth` blocks and apply `forward` inside one state
    /// transaction. On a validation failure the transaction is dropped and
    /// the offending block id returned.
    fn try_apply(&mut self, depth: u64, forward: &[Block]) -> Result<(), BlockId> {
        let old_tip_height = self.dag.committed_tip().0;
        let mut txn = self.store.begin();
        let mut rolled_back: Vec<Block> = Vec::new();
        for _ in 0..depth {
            match txn.rollback_block() {
                Ok(block) => rolled_back.push(block),
                Err(err) => {
                    // depth was bounded by fork choice; this is a bug
                    error!("fatal: staged rollback failed: {}", err);
                    self.fatal();
                }
            }
        }

        let mut applied: Vec<(Block, BlockDiff)> = Vec::new();
        for block in forward {
            let now = WavesTime::now().unwrap_or(block.header.timestamp);
            match validate_block(self.config.scheme, block, txn.reader(), now) {
                Ok(diff) => {
                    if let Err(err) = txn.apply_block(block, diff.clone()) {
                        error!("fatal: staged apply failed for {}: {}", block.id, err);
                        self.fatal();
                    }
                    applied.push((block.clone(), diff));
                }
                Err(err) => {
                    warn!("block {} failed validation: {}", block.id, err);
                    return Err(block.id);
                }
            }
        }

        // the commit makes the new tip canonical; a failure here leaves no
        // safe way to keep state and feed consistent
        if let Err(err) = txn.commit() {
            error!("fatal: state commit failed: {}", err);
            self.fatal();
        }

        let rolled_back_ids: Vec<BlockId> = rolled_back.iter().map(|block| block.id).collect();
        let applied_heights: Vec<(u64, BlockId)> = applied
            .iter()
            .map(|(block, _)| (block.header.height, block.id))
            .collect();
        self.dag.on_commit(&rolled_back_ids, &applied_heights);

        self.publish_to_feed(old_tip_height, depth, &applied);
        self.settle_utx(&rolled_back, &applied);

        for (block, _) in &applied {
            self.channels.peer_manager.broadcast_block(block);
            // subscribers may lag or be absent
            let _ = self.channels.block_sender.send(block.clone());
        }
        let (tip_height, tip_id) = self.dag.committed_tip();
        info!("new canonical tip {} at height {}", tip_id, tip_height);
        let _ = self.channels.controller_event_tx.send(ChainEvent::NewTip {
            height: tip_height,
            block_id: tip_id,
        });
        Ok(())
    }

    /// Emit one `Rollback` record per regression step, then exactly one
    /// `BlockInfo` and one `L2ContractDataEntries` per committed block, in
    /// ascending height order.
    fn publish_to_feed(&mut self, old_tip_height: u64, depth: u64, applied: &[(Block, BlockDiff)]) {
        let mut records = Vec::with_capacity(depth as usize + applied.len() * 2);
        let fork_height = old_tip_height - depth;
        for height in (fork_height..old_tip_height).rev() {
            records.push(FeedRecord::Rollback(RollbackRecord { height }));
        }
        for (block, diff) in applied {
            records.push(FeedRecord::BlockInfo(BlockInfoRecord::from_block(block)));
            records.push(FeedRecord::DataEntries(
                L2ContractDataEntriesRecord::from_block_data(
                    block.header.height,
                    &block.id,
                    &diff.data_writes,
                ),
            ));
        }
        if records.is_empty() {
            return;
        }
        if let Err(err) = self.channels.feed_sink.publish(records) {
            error!("fatal: feed publication failed: {}", err);
            self.fatal();
        }
    }

    /// Drop confirmed ids from the pool and hand rolled-back transactions
    /// back to it for re-admission.
    fn settle_utx(&mut self, rolled_back: &[Block], applied: &[(Block, BlockDiff)]) {
        let confirmed: Vec<_> = applied
            .iter()
            .flat_map(|(_, diff)| diff.transaction_ids.iter().copied())
            .collect();
        if !confirmed.is_empty() {
            self.channels.utx_controller.remove(&confirmed);
        }
        let displaced: Vec<_> = rolled_back
            .iter()
            .flat_map(|block| block.transactions.iter().cloned())
            .collect();
        if !displaced.is_empty() {
            self.channels.utx_controller.add_transactions(displaced);
        }
    }

    /// Administrative rollback to the given height.
    pub(crate) fn rollback_to(&mut self, to_height: u64) -> Result<(), ChainError> {
        let (tip_height, _) = self.dag.committed_tip();
        if to_height >= tip_height {
            return Ok(());
        }
        let depth = tip_height - to_height;
        if depth > self.config.max_rollback {
            return Err(ChainError::RollbackTooDeep {
                depth,
                max: self.config.max_rollback,
            });
        }
        let mut txn = self.store.begin();
        let mut removed = Vec::new();
        for _ in 0..depth {
            removed.push(txn.rollback_block()?);
        }
        let new_tip = txn
            .reader()
            .tip()
            .ok_or_else(|| ChainError::ContainerInconsistency("rolled back past genesis".into()))?;
        if let Err(err) = txn.commit() {
            error!("fatal: state commit failed: {}", err);
            self.fatal();
        }
        let removed_ids: Vec<BlockId> = removed.iter().map(|block| block.id).collect();
        self.dag.on_admin_rollback(&removed_ids, new_tip);

        let mut records = Vec::with_capacity(depth as usize);
        for height in (to_height..tip_height).rev() {
            records.push(FeedRecord::Rollback(RollbackRecord { height }));
        }
        if let Err(err) = self.channels.feed_sink.publish(records) {
            error!("fatal: feed publication failed: {}", err);
            self.fatal();
        }
        let displaced: Vec<_> = removed
            .iter()
            .flat_map(|block| block.transactions.iter().cloned())
            .collect();
        if !displaced.is_empty() {
            self.channels.utx_controller.add_transactions(displaced);
        }
        info!("administratively rolled back to height {}", to_height);
        let _ = self.channels.controller_event_tx.send(ChainEvent::NewTip {
            height: new_tip.0,
            block_id: new_tip.1,
        });
        Ok(())
    }

    /// Graph status of a block, orphan buffer included.
    pub(crate) fn block_status(&self, id: &BlockId) -> BlockGraphStatus {
        if self.orphans.contains(id) {
            return BlockGraphStatus::Orphan;
        }
        self.dag.status(id)
    }

    /// Abort the process: state and feed can no longer be kept consistent.
    /// Recovery is a fresh start replaying from the last durable commit.
    fn fatal(&self) -> ! {
        let _ = self.channels.controller_event_tx.send(ChainEvent::Stop);
        // give the subscriber a beat to flush logs
        std::thread::sleep(std::time::Duration::from_millis(100));
        std::process::abort();
    }
}
