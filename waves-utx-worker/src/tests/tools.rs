// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::pool::UtxPool;
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::{Block, BlockHeader};
use waves_models::block_id::BlockId;
use waves_models::config::BLOCK_REWARD;
use waves_models::scheme::Scheme;
use waves_models::transaction::{Transaction, TransferTransaction};
use waves_signature::KeyPair;
use waves_state_exports::MemoryStateStore;
use waves_time::WavesTime;
use waves_utx_exports::UtxConfig;

/// Millisecond timestamp every fixture transaction is anchored to.
pub(crate) const FIXTURE_NOW: u64 = 1_700_000_100_000;

/// A funded single-account chain and a pool over it.
pub(crate) struct PoolFixture {
    pub config: UtxConfig,
    pub store: MemoryStateStore,
    pub keypair: KeyPair,
}

impl PoolFixture {
    pub(crate) fn new(config: UtxConfig) -> Self {
        let keypair = KeyPair::generate();
        let seed = Hash::compute_from(b"utx-genesis");
        let vrf_proof = keypair.sign(&seed).expect("sign genesis vrf");
        let header = BlockHeader {
            height: 1,
            timestamp: WavesTime::from_millis(FIXTURE_NOW - 100_000),
            parent_id: BlockId(Hash::compute_from(b"void")),
            base_target: 1_000,
            generation_signature: seed,
            vrf_proof,
            features: Vec::new(),
            reward: BLOCK_REWARD,
            generator: keypair.get_public_key(),
            state_root: None,
        };
        let genesis = Block::new_signed(header, Vec::new(), &keypair).expect("sign genesis");
        let sender = Address::from_public_key(config.scheme, &keypair.get_public_key());
        let store = MemoryStateStore::new(
            genesis,
            vec![(sender, Amount::from_raw(1_000_000_00000000))],
        );
        PoolFixture {
            config,
            store,
            keypair,
        }
    }

    pub(crate) fn pool(&self) -> UtxPool {
        UtxPool::init(self.config)
    }

    pub(crate) fn now(&self) -> WavesTime {
        WavesTime::from_millis(FIXTURE_NOW)
    }
}

/// Signed-transfer generator in the builder style.
#[derive(Clone)]
pub(crate) struct TxGenerator {
    fee: u64,
    amount: u64,
    timestamp: WavesTime,
    attachment_len: usize,
    scheme: Scheme,
}

impl Default for TxGenerator {
    fn default() -> Self {
        TxGenerator {
            fee: 10_000_000,
            amount: 1_00000000,
            timestamp: WavesTime::from_millis(FIXTURE_NOW - 1_000),
            attachment_len: 0,
            scheme: Scheme::MAINNET,
        }
    }
}

impl TxGenerator {
    pub(crate) fn fee(mut self, fee: u64) -> Self {
        self.fee = fee;
        self
    }

    pub(crate) fn amount(mut self, amount: u64) -> Self {
        self.amount = amount;
        self
    }

    pub(crate) fn timestamp(mut self, timestamp: WavesTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub(crate) fn attachment_len(mut self, attachment_len: usize) -> Self {
        self.attachment_len = attachment_len;
        self
    }

    pub(crate) fn generate(&self, sender: &KeyPair) -> Transaction {
        let recipient =
            Address::from_public_key(self.scheme, &KeyPair::generate().get_public_key());
        let mut transaction = Transaction::Transfer(TransferTransaction {
            version: 3,
            chain_id: self.scheme.to_byte(),
            sender_public_key: sender.get_public_key(),
            recipient,
            amount: Amount::from_raw(self.amount),
            fee: Amount::from_raw(self.fee),
            timestamp: self.timestamp,
            attachment: vec![0u8; self.attachment_len],
            proofs: Vec::new(),
        });
        transaction.sign(sender).expect("sign generated transfer");
        transaction
    }
}
