// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use tracing::debug;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::transaction::Transaction;
use waves_protocol_exports::PeerManager;

/// Placeholder peer manager wired until a transport attaches.
///
/// The peer manager is an external collaborator: this stand-in satisfies the
/// seam so the core runs standalone, logging what it would have sent.
#[derive(Clone, Default)]
pub struct DisconnectedPeerManager;

impl PeerManager for DisconnectedPeerManager {
    fn request_block(&self, block_id: BlockId) {
        debug!("no transport attached, cannot fetch {}", block_id);
    }

    fn broadcast_block(&self, block: &Block) {
        debug!("no transport attached, not propagating block {}", block.id);
    }

    fn broadcast_transactions(&self, transactions: &[Transaction]) {
        debug!(
            "no transport attached, not propagating {} transactions",
            transactions.len()
        );
    }

    fn clone_box(&self) -> Box<dyn PeerManager> {
        Box::new(self.clone())
    }
}
