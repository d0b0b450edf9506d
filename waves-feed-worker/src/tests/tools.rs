// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use std::path::PathBuf;
use waves_feed_exports::FeedConfig;
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::{Block, BlockHeader};
use waves_models::block_id::BlockId;
use waves_models::config::BLOCK_REWARD;
use waves_models::data_entry::{DataEntry, DataValue};
use waves_models::scheme::Scheme;
use waves_signature::KeyPair;
use waves_state_exports::{BlockDiff, MemoryStateStore, StateStore};
use waves_time::WavesTime;

pub(crate) const FEED_GENESIS_TIMESTAMP: u64 = 1_700_000_000_000;

/// A committed chain the feed can rebuild records from, plus a temp dir for
/// the durable cursor.
pub(crate) struct FeedFixture {
    pub store: MemoryStateStore,
    pub blocks: Vec<Block>,
    pub dir: tempfile::TempDir,
}

impl FeedFixture {
    /// A chain committed up to `height` blocks, each carrying one data write.
    pub(crate) fn with_chain(height: u64) -> Self {
        let keypair = KeyPair::generate();
        let seed = Hash::compute_from(b"feed-fixture-genesis");
        let vrf_proof = keypair.sign(&seed).expect("sign genesis vrf");
        let header = BlockHeader {
            height: 1,
            timestamp: WavesTime::from_millis(FEED_GENESIS_TIMESTAMP),
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
        let store = MemoryStateStore::new(genesis.clone(), Vec::new());
        let mut blocks = vec![genesis];
        let contract = Address::from_public_key(Scheme::MAINNET, &keypair.get_public_key());

        for next_height in 2..=height {
            let parent = blocks.last().expect("chain never empty");
            let vrf_proof = keypair
                .sign(&parent.header.generation_signature)
                .expect("sign vrf");
            let vrf_output = Hash::compute_from(&vrf_proof.to_bytes());
            let header = BlockHeader {
                height: next_height,
                timestamp: parent
                    .header
                    .timestamp
                    .saturating_add(WavesTime::from_millis(60_000)),
                parent_id: parent.id,
                base_target: parent.header.base_target,
                generation_signature: Hash::compute_from_tuple(&[
                    parent.header.generation_signature.to_bytes(),
                    vrf_output.to_bytes(),
                ]),
                vrf_proof,
                features: Vec::new(),
                reward: BLOCK_REWARD,
                generator: keypair.get_public_key(),
                state_root: None,
            };
            let block = Block::new_signed(header, Vec::new(), &keypair).expect("sign block");
            let mut diff = BlockDiff::default();
            diff.balances.insert(contract, Amount::from_raw(next_height));
            diff.data_writes.push((
                contract,
                DataEntry {
                    key: format!("height_{}", next_height),
                    value: DataValue::Integer(next_height as i64),
                },
            ));
            let mut txn = store.begin();
            txn.apply_block(&block, diff).expect("apply fixture block");
            txn.commit().expect("commit fixture block");
            blocks.push(block);
        }
        FeedFixture {
            store,
            blocks,
            dir: tempfile::tempdir().expect("create temp dir"),
        }
    }

    pub(crate) fn config(&self) -> FeedConfig {
        FeedConfig::with_storage_dir(self.dir.path().to_path_buf())
    }

    pub(crate) fn config_with_window(&self, ack_window: u64) -> FeedConfig {
        FeedConfig {
            ack_window,
            ..self.config()
        }
    }

    pub(crate) fn cursor_path(&self) -> PathBuf {
        self.config().cursor_path
    }

    pub(crate) fn block(&self, height: u64) -> &Block {
        &self.blocks[height as usize - 1]
    }
}
