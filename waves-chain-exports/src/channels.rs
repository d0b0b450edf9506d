// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::events::ChainEvent;
use waves_feed_exports::FeedSink;
use waves_models::block::Block;
use waves_protocol_exports::PeerManager;
use waves_utx_exports::UtxController;

/// Links to the other modules the chain worker interacts with.
#[derive(Clone)]
pub struct ChainChannels {
    /// interface to the UTX pool
    pub utx_controller: Box<dyn UtxController>,
    /// interface to the L2 feed
    pub feed_sink: Box<dyn FeedSink>,
    /// interface to the peer manager, for parent fetches and propagation
    pub peer_manager: Box<dyn PeerManager>,
    /// channel used by the worker to send events to the node globally
    pub controller_event_tx: crossbeam::channel::Sender<ChainEvent>,
    /// broadcast channel for blocks newly committed to the canonical chain
    pub block_sender: tokio::sync::broadcast::Sender<Block>,
}
