// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::state::ChainState;
use crossbeam::channel::Sender;
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use waves_chain_exports::{
    BlockGraphStatus, BlockOrigin, ChainCommand, ChainController, ChainError,
};
use waves_channel::sender::WavesSender;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::transaction::{Transaction, TransactionId};
use waves_utx_exports::AdmissionError;

#[derive(Clone)]
pub(crate) struct ChainControllerImpl {
    pub(crate) command_sender: WavesSender<ChainCommand>,
    pub(crate) shared_state: Arc<RwLock<ChainState>>,
}

impl ChainController for ChainControllerImpl {
    fn register_block(&self, block: Block, origin: BlockOrigin) -> Result<(), ChainError> {
        self.command_sender
            .try_send(ChainCommand::RegisterBlock { block, origin })
            .map_err(|_| ChainError::QueueFull)
    }

    fn rollback(&self, to_height: u64) -> Result<(), ChainError> {
        self.command_sender
            .send(ChainCommand::Rollback { to_height })
            .map_err(|err| ChainError::ChannelError(err.to_string()))
    }

    fn broadcast_transaction(
        &self,
        transaction: Transaction,
        reply: Sender<Result<TransactionId, AdmissionError>>,
        timeout: Duration,
    ) -> Result<(), ChainError> {
        self.command_sender
            .send_timeout(
                ChainCommand::BroadcastTransaction { transaction, reply },
                timeout,
            )
            .map_err(|_| ChainError::QueueFull)
    }

    fn get_tip(&self) -> (u64, BlockId) {
        self.shared_state.read().dag.committed_tip()
    }

    fn get_block_statuses(&self, ids: &[BlockId]) -> Vec<BlockGraphStatus> {
        let read_shared_state = self.shared_state.read();
        ids.iter()
            .map(|id| read_shared_state.block_status(id))
            .collect()
    }

    fn get_block_at_height(&self, height: u64) -> Option<Block> {
        self.shared_state.read().store.snapshot().block_at_height(height)
    }

    fn clone_box(&self) -> Box<dyn ChainController> {
        Box::new(self.clone())
    }
}
