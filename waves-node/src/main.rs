// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

//! Waves node core binary: wires the state store, the UTX pool, the L2 feed,
//! the applier and the message router, then waits for a shutdown signal.

mod genesis;
mod peer_stub;
mod settings;

use crate::peer_stub::DisconnectedPeerManager;
use crate::settings::SETTINGS;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use waves_chain_exports::{ChainChannels, ChainConfig, ChainController, ChainEvent, ChainManager};
use waves_chain_worker::start_chain_controller;
use waves_feed_exports::{FeedConfig, FeedController, FeedManager};
use waves_feed_worker::start_feed_worker;
use waves_models::config::VERSION;
use waves_models::scheme::Scheme;
use waves_protocol_exports::{ProtocolConfig, ProtocolController, ProtocolManager};
use waves_protocol_worker::start_protocol_controller;
use waves_state_exports::{MemoryStateStore, StateStore};
use waves_utx_exports::{UtxConfig, UtxManager};
use waves_utx_worker::start_utx_controller;

struct Managers {
    protocol: Box<dyn ProtocolManager>,
    chain: Box<dyn ChainManager>,
    utx: Box<dyn UtxManager>,
    feed: Box<dyn FeedManager>,
}

#[allow(clippy::type_complexity)]
fn launch() -> (
    Box<dyn ProtocolController>,
    Box<dyn ChainController>,
    Box<dyn FeedController>,
    crossbeam::channel::Receiver<ChainEvent>,
    Managers,
) {
    info!("Node version: {}", *VERSION);
    let scheme = Scheme(SETTINGS.network.scheme as u8);

    // the persistent store is an external collaborator; standalone mode runs
    // on the in-memory reference store seeded with the deterministic genesis
    let (genesis_block, initial_balances) =
        genesis::build_genesis(scheme, &SETTINGS.genesis).expect("invalid genesis settings");
    info!(
        "genesis block {} on network {}",
        genesis_block.id, scheme
    );
    let store = MemoryStateStore::new(genesis_block, initial_balances);

    // launch the L2 feed
    let (feed_manager, feed_sink, feed_controller) = start_feed_worker(
        FeedConfig::with_storage_dir(SETTINGS.storage.path.clone()),
        store.clone_box(),
    )
    .expect("could not start feed worker");

    // launch the UTX pool
    let (utx_manager, utx_controller) = start_utx_controller(
        UtxConfig {
            scheme,
            ..UtxConfig::default()
        },
        store.clone_box(),
    );

    // launch the applier
    let (event_tx, event_rx) = crossbeam::channel::unbounded();
    let (block_sender, _) = tokio::sync::broadcast::channel(SETTINGS_BLOCK_CHANNEL);
    let (chain_controller, chain_manager) = start_chain_controller(
        ChainConfig::new(scheme),
        ChainChannels {
            utx_controller: utx_controller.clone(),
            feed_sink,
            peer_manager: Box::new(DisconnectedPeerManager),
            controller_event_tx: event_tx,
            block_sender,
        },
        store.clone_box(),
    )
    .expect("could not start chain worker");

    // launch the router
    let (protocol_controller, protocol_manager) = start_protocol_controller(
        ProtocolConfig::new(scheme, SETTINGS.network.api_key.clone()),
        chain_controller.clone(),
        utx_controller,
        Box::new(DisconnectedPeerManager),
    );

    (
        protocol_controller,
        chain_controller,
        feed_controller,
        event_rx,
        Managers {
            protocol: protocol_manager,
            chain: chain_manager,
            utx: utx_manager,
            feed: feed_manager,
        },
    )
}

const SETTINGS_BLOCK_CHANNEL: usize = 128;

fn stop(mut managers: Managers) {
    // reverse launch order: stop the surfaces before their dependencies
    managers.protocol.stop();
    managers.chain.stop();
    managers.utx.stop();
    managers.feed.stop();
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(SETTINGS.logging.level.clone())),
        )
        .init();

    let (_protocol_controller, chain_controller, _feed_controller, event_rx, managers) = launch();
    let (tip_height, tip_id) = chain_controller.get_tip();
    info!("canonical tip {} at height {}", tip_id, tip_height);

    // bridge the worker event channel into the async select below
    let (stop_tx, mut stop_rx) = tokio::sync::mpsc::channel(1);
    std::thread::Builder::new()
        .name("event bridge".into())
        .spawn(move || {
            while let Ok(event) = event_rx.recv() {
                match event {
                    ChainEvent::NewTip { height, block_id } => {
                        info!("canonical tip {} at height {}", block_id, height);
                    }
                    ChainEvent::Stop => {
                        error!("chain worker requested a stop");
                        let _ = stop_tx.blocking_send(());
                        break;
                    }
                }
            }
        })
        .expect("can't spawn event bridge thread");

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("interrupt signal received");
        }
        _ = stop_rx.recv() => {}
    }
    stop(managers);
    info!("node stopped");
}
