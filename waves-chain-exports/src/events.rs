// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use waves_models::block_id::BlockId;

/// Events sent by the chain worker to the node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainEvent {
    /// the canonical tip advanced or moved to another branch
    NewTip {
        /// tip height
        height: u64,
        /// tip block id
        block_id: BlockId,
    },
    /// the worker hit a fatal condition and the node must stop
    Stop,
}
