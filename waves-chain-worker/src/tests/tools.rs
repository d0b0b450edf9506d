// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};
use waves_chain_exports::{ChainChannels, ChainConfig, ChainController, ChainEvent, ChainManager};
use waves_feed_exports::{FeedError, FeedRecord, FeedSink};
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::{Block, BlockHeader};
use waves_models::block_id::BlockId;
use waves_models::config::{BASE_TARGET_WINDOW, BLOCK_REWARD};
use waves_models::scheme::Scheme;
use waves_models::transaction::{Transaction, TransferTransaction};
use waves_protocol_exports::PeerManager;
use waves_signature::KeyPair;
use waves_state_exports::{MemoryStateStore, StateStore};
use waves_time::WavesTime;
use waves_utx_exports::{UtxConfig, UtxController, UtxManager};
use waves_utx_worker::start_utx_controller;
use waves_validator::pos;

/// Base target that keeps both fixture generators always eligible.
pub(crate) const TEST_BASE_TARGET: u64 = 1_000_000_000_000;
pub(crate) const TEST_GENESIS_TIMESTAMP: u64 = 1_700_000_000_000;

/// Feed sink that records everything published to it.
#[derive(Clone, Default)]
pub(crate) struct CollectingFeedSink {
    pub records: Arc<Mutex<Vec<FeedRecord>>>,
}

impl FeedSink for CollectingFeedSink {
    fn publish(&self, records: Vec<FeedRecord>) -> Result<(), FeedError> {
        self.records.lock().extend(records);
        Ok(())
    }

    fn clone_box(&self) -> Box<dyn FeedSink> {
        Box::new(self.clone())
    }
}

/// Peer manager that records parent fetch requests.
#[derive(Clone, Default)]
pub(crate) struct RecordingPeerManager {
    pub requested: Arc<Mutex<Vec<BlockId>>>,
}

impl PeerManager for RecordingPeerManager {
    fn request_block(&self, block_id: BlockId) {
        self.requested.lock().push(block_id);
    }

    fn broadcast_block(&self, _block: &Block) {}

    fn broadcast_transactions(&self, _transactions: &[Transaction]) {}

    fn clone_box(&self) -> Box<dyn PeerManager> {
        Box::new(self.clone())
    }
}

/// A two-generator chain fixture with a launched worker stack.
pub(crate) struct ChainFixture {
    pub scheme: Scheme,
    pub generator_a: KeyPair,
    pub generator_b: KeyPair,
    pub store: MemoryStateStore,
    pub genesis: Block,
    pub feed: CollectingFeedSink,
    pub peers: RecordingPeerManager,
    pub event_rx: crossbeam::channel::Receiver<ChainEvent>,
    pub chain_controller: Box<dyn ChainController>,
    pub utx_controller: Box<dyn UtxController>,
    chain_manager: Box<dyn ChainManager>,
    utx_manager: Box<dyn UtxManager>,
}

impl ChainFixture {
    pub(crate) fn launch() -> Self {
        Self::launch_with(ChainConfig::new(Scheme::MAINNET))
    }

    pub(crate) fn launch_with(config: ChainConfig) -> Self {
        let scheme = config.scheme;
        let generator_a = KeyPair::generate();
        let generator_b = KeyPair::generate();
        let seed = Hash::compute_from(b"chain-fixture-genesis");
        let vrf_proof = generator_a.sign(&seed).expect("sign genesis vrf");
        let header = BlockHeader {
            height: 1,
            timestamp: WavesTime::from_millis(TEST_GENESIS_TIMESTAMP),
            parent_id: BlockId(Hash::compute_from(b"void")),
            base_target: TEST_BASE_TARGET,
            generation_signature: seed,
            vrf_proof,
            features: Vec::new(),
            reward: BLOCK_REWARD,
            generator: generator_a.get_public_key(),
            state_root: None,
        };
        let genesis =
            Block::new_signed(header, Vec::new(), &generator_a).expect("sign genesis block");
        let funds = Amount::from_raw(10_000_00000000);
        let store = MemoryStateStore::new(
            genesis.clone(),
            vec![
                (
                    Address::from_public_key(scheme, &generator_a.get_public_key()),
                    funds,
                ),
                (
                    Address::from_public_key(scheme, &generator_b.get_public_key()),
                    funds,
                ),
            ],
        );

        let (utx_manager, utx_controller) =
            start_utx_controller(UtxConfig { scheme, ..UtxConfig::default() }, store.clone_box());
        let feed = CollectingFeedSink::default();
        let peers = RecordingPeerManager::default();
        let (event_tx, event_rx) = crossbeam::channel::unbounded();
        let (block_sender, _) = tokio::sync::broadcast::channel(16);
        let channels = ChainChannels {
            utx_controller: utx_controller.clone(),
            feed_sink: feed.clone_box(),
            peer_manager: peers.clone_box(),
            controller_event_tx: event_tx,
            block_sender,
        };
        let (chain_controller, chain_manager) =
            start_chain_controller_for_tests(config, channels, store.clone_box());

        ChainFixture {
            scheme,
            generator_a,
            generator_b,
            store,
            genesis,
            feed,
            peers,
            event_rx,
            chain_controller,
            utx_controller,
            chain_manager,
            utx_manager,
        }
    }

    /// Build a rule-abiding child of `ancestors.last()`, where `ancestors`
    /// is the full branch path starting at genesis.
    pub(crate) fn child_of(
        &self,
        ancestors: &[&Block],
        transactions: Vec<Transaction>,
        generator: &KeyPair,
    ) -> Block {
        let parent = ancestors.last().expect("ancestors must end at the parent");
        let window = (BASE_TARGET_WINDOW as usize).min(ancestors.len());
        let recent: Vec<BlockHeader> = ancestors[ancestors.len() - window..]
            .iter()
            .map(|block| block.header.clone())
            .collect();
        let base_target = pos::expected_base_target(&recent);
        let vrf_proof = generator
            .sign(&parent.header.generation_signature)
            .expect("sign vrf");
        let vrf_output = Hash::compute_from(&vrf_proof.to_bytes());
        let header = BlockHeader {
            height: parent.header.height + 1,
            timestamp: parent
                .header
                .timestamp
                .saturating_add(WavesTime::from_millis(60_000)),
            parent_id: parent.id,
            base_target,
            generation_signature: pos::next_generation_signature(
                &parent.header.generation_signature,
                &vrf_output,
            ),
            vrf_proof,
            features: Vec::new(),
            reward: BLOCK_REWARD,
            generator: generator.get_public_key(),
            state_root: None,
        };
        Block::new_signed(header, transactions, generator).expect("sign child block")
    }

    /// A signed transfer from generator A.
    pub(crate) fn transfer(&self, amount: u64, fee: u64) -> Transaction {
        let recipient =
            Address::from_public_key(self.scheme, &KeyPair::generate().get_public_key());
        let mut transaction = Transaction::Transfer(TransferTransaction {
            version: 3,
            chain_id: self.scheme.to_byte(),
            sender_public_key: self.generator_a.get_public_key(),
            recipient,
            amount: Amount::from_raw(amount),
            fee: Amount::from_raw(fee),
            timestamp: WavesTime::now().expect("clock"),
            attachment: Vec::new(),
            proofs: Vec::new(),
        });
        transaction.sign(&self.generator_a).expect("sign transfer");
        transaction
    }

    /// Wait until the committed tip matches, or panic after two seconds.
    pub(crate) fn wait_for_tip(&self, expected: BlockId) {
        wait_until(
            || self.chain_controller.get_tip().1 == expected,
            "tip never reached the expected block",
        );
    }

    /// Stop the launched workers.
    pub(crate) fn shutdown(mut self) {
        self.chain_manager.stop();
        self.utx_manager.stop();
    }
}

fn start_chain_controller_for_tests(
    config: ChainConfig,
    channels: ChainChannels,
    store: Box<dyn StateStore>,
) -> (Box<dyn ChainController>, Box<dyn ChainManager>) {
    crate::start_chain_controller(config, channels, store).expect("start chain controller")
}

/// Poll until the condition holds, panicking after two seconds.
pub(crate) fn wait_until(condition: impl Fn() -> bool, message: &str) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    panic!("{}", message);
}
