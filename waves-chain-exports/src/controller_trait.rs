// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::block_status::BlockGraphStatus;
use crate::commands::BlockOrigin;
use crate::error::ChainError;
use crossbeam::channel::Sender;
use std::time::Duration;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::transaction::{Transaction, TransactionId};
use waves_utx_exports::AdmissionError;

/// Interface that communicates with the applier worker thread.
pub trait ChainController: Send + Sync {
    /// Enqueue a candidate block. Fails with `QueueFull` instead of blocking,
    /// so peer ingest back-pressures at the caller.
    fn register_block(&self, block: Block, origin: BlockOrigin) -> Result<(), ChainError>;

    /// Enqueue an admin rollback to the given height.
    fn rollback(&self, to_height: u64) -> Result<(), ChainError>;

    /// Enqueue a transaction broadcast carrying its single-use reply channel.
    /// Gives up with `QueueFull` when no applier queue slot frees within
    /// `timeout`; the transaction is then nowhere.
    fn broadcast_transaction(
        &self,
        transaction: Transaction,
        reply: Sender<Result<TransactionId, AdmissionError>>,
        timeout: Duration,
    ) -> Result<(), ChainError>;

    /// Committed canonical tip.
    fn get_tip(&self) -> (u64, BlockId);

    /// Graph statuses of the given blocks, in input order.
    fn get_block_statuses(&self, ids: &[BlockId]) -> Vec<BlockGraphStatus>;

    /// Committed block at the given canonical height.
    fn get_block_at_height(&self, height: u64) -> Option<Block>;

    /// Returns a boxed clone of self, to allow cloning `Box<dyn ChainController>`.
    fn clone_box(&self) -> Box<dyn ChainController>;
}

impl Clone for Box<dyn ChainController> {
    fn clone(&self) -> Box<dyn ChainController> {
        self.clone_box()
    }
}

/// Chain manager used to stop the applier thread.
pub trait ChainManager {
    /// Stop the applier after the in-flight command finishes.
    fn stop(&mut self);
}
