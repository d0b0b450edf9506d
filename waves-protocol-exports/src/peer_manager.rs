// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::transaction::Transaction;

/// Seam to the peer manager, which owns discovery, framing and gossip.
///
/// The core only ever asks for missing parents and hands out payloads to
/// propagate; everything else about the transport is out of scope.
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait PeerManager: Send + Sync {
    /// Ask peers for a block body, used for unknown parents.
    fn request_block(&self, block_id: BlockId);

    /// Propagate a committed block.
    fn broadcast_block(&self, block: &Block);

    /// Propagate admitted transactions.
    fn broadcast_transactions(&self, transactions: &[Transaction]);

    /// Returns a boxed clone of self, to allow cloning `Box<dyn PeerManager>`.
    fn clone_box(&self) -> Box<dyn PeerManager>;
}

impl Clone for Box<dyn PeerManager> {
    fn clone(&self) -> Box<dyn PeerManager> {
        self.clone_box()
    }
}
