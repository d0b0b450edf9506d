// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;
use waves_validator::ValidationError;

/// Errors of the chain worker.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum ChainError {
    /// reorganization depth {depth} exceeds the maximum {max}
    RollbackTooDeep {
        /// required rollback depth
        depth: u64,
        /// configured maximum
        max: u64,
    },
    /// parent of the candidate block is unknown
    ParentUnknown,
    /// the applier command queue is full
    QueueFull,
    /// block failed validation: {0}
    InvalidBlock(#[from] ValidationError),
    /// state error: {0}
    StateError(#[from] waves_state_exports::StateError),
    /// models error: {0}
    ModelsError(#[from] waves_models::ModelsError),
    /// time error: {0}
    TimeError(#[from] waves_time::TimeError),
    /// channel error: {0}
    ChannelError(String),
    /// container inconsistency: {0}
    ContainerInconsistency(String),
}
