// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crossbeam::channel::Sender;
use waves_models::block::Block;
use waves_models::transaction::{Transaction, TransactionId};
use waves_utx_exports::AdmissionError;

/// Where a candidate block came from. Only peer blocks trigger parent
/// fetches and orphan parking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOrigin {
    /// received from the peer manager
    Peer,
    /// produced by the local miner
    Miner,
    /// injected through the admin surface
    Admin,
}

/// Commands of the single-writer applier queue. One command is processed at
/// a time, which serializes every state and feed mutation.
#[derive(Clone)]
pub enum ChainCommand {
    /// register a candidate block and re-run fork choice
    RegisterBlock {
        /// the candidate
        block: Block,
        /// its origin
        origin: BlockOrigin,
    },
    /// administratively roll the canonical chain back
    Rollback {
        /// target tip height
        to_height: u64,
    },
    /// admit one transaction with a verdict, serialized behind every commit
    /// that linearized before it
    BroadcastTransaction {
        /// the candidate transaction
        transaction: Transaction,
        /// single-use verdict channel
        reply: Sender<Result<TransactionId, AdmissionError>>,
    },
    /// drain and stop
    Stop,
}
