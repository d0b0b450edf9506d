// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::controller_traits::{StateReader, StateStore, StateTransaction};
use crate::error::StateError;
use crate::overlay::BlockDiff;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::debug;
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::data_entry::{DataEntry, DataValue};
use waves_models::transaction::TransactionId;

/// Full account state after one height. The memory store keeps one of these
/// per committed block, which makes rollback a truncation.
#[derive(Clone, Debug)]
struct StateAt {
    block: Block,
    balances: HashMap<Address, Amount>,
    data: HashMap<(Address, String), DataValue>,
    data_writes: Vec<(Address, DataEntry)>,
    confirmed: HashSet<TransactionId>,
}

#[derive(Clone, Debug, Default)]
struct MemInner {
    /// states[h - 1] is the state after the block at height h
    states: Vec<StateAt>,
}

impl MemInner {
    fn top(&self) -> Option<&StateAt> {
        self.states.last()
    }

    fn state_root_of(state: &StateAt) -> Hash {
        let mut bytes = Vec::new();
        let mut balance_keys: Vec<&Address> = state.balances.keys().collect();
        balance_keys.sort();
        for address in balance_keys {
            bytes.extend_from_slice(address.to_bytes());
            bytes.extend_from_slice(&state.balances[address].to_raw().to_be_bytes());
        }
        let mut data_keys: Vec<&(Address, String)> = state.data.keys().collect();
        data_keys.sort();
        for key in data_keys {
            bytes.extend_from_slice(key.0.to_bytes());
            bytes.extend_from_slice(key.1.as_bytes());
        }
        Hash::compute_from(&bytes)
    }

    fn apply(&mut self, block: &Block, diff: BlockDiff) -> Result<(), StateError> {
        let expected_height = self.states.len() as u64 + 1;
        if block.header.height != expected_height {
            return Err(StateError::ContainerInconsistency(format!(
                "applying block at height {} on top of height {}",
                block.header.height,
                self.states.len()
            )));
        }
        let mut next = match self.top() {
            Some(top) => StateAt {
                block: block.clone(),
                balances: top.balances.clone(),
                data: top.data.clone(),
                data_writes: Vec::new(),
                confirmed: top.confirmed.clone(),
            },
            None => StateAt {
                block: block.clone(),
                balances: HashMap::new(),
                data: HashMap::new(),
                data_writes: Vec::new(),
                confirmed: HashSet::new(),
            },
        };
        for (address, balance) in diff.balances {
            next.balances.insert(address, balance);
        }
        for (address, entry) in &diff.data_writes {
            match &entry.value {
                DataValue::Delete => {
                    next.data.remove(&(*address, entry.key.clone()));
                }
                value => {
                    next.data
                        .insert((*address, entry.key.clone()), value.clone());
                }
            }
        }
        next.data_writes = diff.data_writes;
        next.confirmed.extend(diff.transaction_ids);
        self.states.push(next);
        Ok(())
    }

    fn rollback(&mut self) -> Result<Block, StateError> {
        if self.states.len() <= 1 {
            return Err(StateError::GenesisRollback);
        }
        // the unwrap cannot fail: length checked just above
        Ok(self.states.pop().unwrap().block)
    }
}

/// Snapshot over a cloned inner state.
struct MemSnapshot {
    inner: MemInner,
}

impl StateReader for MemSnapshot {
    fn tip(&self) -> Option<(u64, BlockId)> {
        self.inner
            .top()
            .map(|state| (state.block.header.height, state.block.id))
    }

    fn balance(&self, address: &Address) -> Amount {
        self.inner
            .top()
            .and_then(|state| state.balances.get(address).copied())
            .unwrap_or(Amount::ZERO)
    }

    fn generating_balance(&self, address: &Address, depth: u64) -> Amount {
        let states = &self.inner.states;
        if states.is_empty() {
            return Amount::ZERO;
        }
        // measured at the block `depth` below the tip, clamped at genesis
        let index = states.len().saturating_sub(depth as usize + 1);
        states[index]
            .balances
            .get(address)
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn data_entry(&self, address: &Address, key: &str) -> Option<DataValue> {
        self.inner
            .top()
            .and_then(|state| state.data.get(&(*address, key.to_string())).cloned())
    }

    fn block_at_height(&self, height: u64) -> Option<Block> {
        if height == 0 {
            return None;
        }
        self.inner
            .states
            .get(height as usize - 1)
            .map(|state| state.block.clone())
    }

    fn data_entries_at_height(&self, height: u64) -> Vec<(Address, DataEntry)> {
        if height == 0 {
            return Vec::new();
        }
        self.inner
            .states
            .get(height as usize - 1)
            .map(|state| state.data_writes.clone())
            .unwrap_or_default()
    }

    fn contains_transaction(&self, id: &TransactionId) -> bool {
        self.inner
            .top()
            .map(|state| state.confirmed.contains(id))
            .unwrap_or(false)
    }

    fn state_root(&self) -> Hash {
        match self.inner.top() {
            Some(state) => MemInner::state_root_of(state),
            None => Hash::compute_from(&[]),
        }
    }
}

/// In-memory reference state store.
///
/// Commits clone-and-swap the whole inner state under a write lock, which
/// gives the atomicity the seam requires at test scale.
#[derive(Clone)]
pub struct MemoryStateStore {
    inner: Arc<RwLock<MemInner>>,
}

impl MemoryStateStore {
    /// Create a store holding only the genesis block and its initial
    /// balances.
    pub fn new(genesis: Block, initial_balances: Vec<(Address, Amount)>) -> Self {
        let mut balances = HashMap::new();
        for (address, amount) in initial_balances {
            balances.insert(address, amount);
        }
        let state = StateAt {
            block: genesis,
            balances,
            data: HashMap::new(),
            data_writes: Vec::new(),
            confirmed: HashSet::new(),
        };
        MemoryStateStore {
            inner: Arc::new(RwLock::new(MemInner {
                states: vec![state],
            })),
        }
    }
}

struct MemTransaction<'a> {
    store: &'a MemoryStateStore,
    staged: MemSnapshot,
}

impl StateTransaction for MemTransaction<'_> {
    fn reader(&self) -> &dyn StateReader {
        &self.staged
    }

    fn rollback_block(&mut self) -> Result<Block, StateError> {
        self.staged.inner.rollback()
    }

    fn apply_block(&mut self, block: &Block, diff: BlockDiff) -> Result<(), StateError> {
        self.staged.inner.apply(block, diff)
    }

    fn commit(self: Box<Self>) -> Result<(), StateError> {
        let mut inner = self.store.inner.write();
        debug!(
            "memory state commit: {} -> {} blocks",
            inner.states.len(),
            self.staged.inner.states.len()
        );
        *inner = self.staged.inner;
        Ok(())
    }
}

impl StateStore for MemoryStateStore {
    fn snapshot(&self) -> Box<dyn StateReader> {
        Box::new(MemSnapshot {
            inner: self.inner.read().clone(),
        })
    }

    fn begin(&self) -> Box<dyn StateTransaction + '_> {
        Box::new(MemTransaction {
            store: self,
            staged: MemSnapshot {
                inner: self.inner.read().clone(),
            },
        })
    }

    fn clone_box(&self) -> Box<dyn StateStore> {
        Box::new(self.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waves_models::config::BLOCK_REWARD;
    use waves_models::scheme::Scheme;
    use waves_signature::KeyPair;
    use waves_time::WavesTime;

    fn genesis(keypair: &KeyPair) -> Block {
        let prev = Hash::compute_from(b"genesis-seed");
        let vrf_proof = keypair.sign(&prev).unwrap();
        let header = waves_models::block::BlockHeader {
            height: 1,
            timestamp: WavesTime::from_millis(1_700_000_000_000),
            parent_id: BlockId(Hash::compute_from(b"void")),
            base_target: 100,
            generation_signature: prev,
            vrf_proof,
            features: Vec::new(),
            reward: BLOCK_REWARD,
            generator: keypair.get_public_key(),
            state_root: None,
        };
        Block::new_signed(header, Vec::new(), keypair).unwrap()
    }

    fn next_block(parent: &Block, keypair: &KeyPair) -> Block {
        let vrf_proof = keypair
            .sign(&parent.header.generation_signature)
            .unwrap();
        let vrf_output = Hash::compute_from(&vrf_proof.to_bytes());
        let header = waves_models::block::BlockHeader {
            height: parent.header.height + 1,
            timestamp: parent.header.timestamp.saturating_add(WavesTime::from_millis(60_000)),
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
        Block::new_signed(header, Vec::new(), keypair).unwrap()
    }

    #[test]
    fn commit_publishes_staged_blocks_atomically() {
        let keypair = KeyPair::generate();
        let genesis_block = genesis(&keypair);
        let store = MemoryStateStore::new(genesis_block.clone(), Vec::new());
        let block2 = next_block(&genesis_block, &keypair);

        let mut txn = store.begin();
        txn.apply_block(&block2, BlockDiff::default()).unwrap();
        // staged but not committed: outside snapshots still see genesis
        assert_eq!(store.snapshot().tip().unwrap().0, 1);
        assert_eq!(txn.reader().tip().unwrap().0, 2);
        txn.commit().unwrap();
        assert_eq!(store.snapshot().tip().unwrap(), (2, block2.id));
    }

    #[test]
    fn rollback_truncates_to_parent() {
        let keypair = KeyPair::generate();
        let genesis_block = genesis(&keypair);
        let store = MemoryStateStore::new(genesis_block.clone(), Vec::new());
        let block2 = next_block(&genesis_block, &keypair);

        let mut txn = store.begin();
        txn.apply_block(&block2, BlockDiff::default()).unwrap();
        let rolled_back = txn.rollback_block().unwrap();
        assert_eq!(rolled_back.id, block2.id);
        assert_eq!(txn.reader().tip().unwrap().0, 1);
        assert!(matches!(
            txn.rollback_block(),
            Err(StateError::GenesisRollback)
        ));
    }

    #[test]
    fn balances_and_data_follow_diffs() {
        let keypair = KeyPair::generate();
        let holder = Address::from_public_key(Scheme::MAINNET, &keypair.get_public_key());
        let genesis_block = genesis(&keypair);
        let store =
            MemoryStateStore::new(genesis_block.clone(), vec![(holder, Amount::from_raw(500))]);
        let block2 = next_block(&genesis_block, &keypair);

        let mut diff = BlockDiff::default();
        diff.balances.insert(holder, Amount::from_raw(450));
        diff.data_writes.push((
            holder,
            DataEntry {
                key: "flag".into(),
                value: DataValue::Boolean(true),
            },
        ));
        let mut txn = store.begin();
        txn.apply_block(&block2, diff).unwrap();
        txn.commit().unwrap();

        let snapshot = store.snapshot();
        assert_eq!(snapshot.balance(&holder), Amount::from_raw(450));
        assert_eq!(
            snapshot.data_entry(&holder, "flag"),
            Some(DataValue::Boolean(true))
        );
        assert_eq!(snapshot.data_entries_at_height(2).len(), 1);
        // generating balance at depth 1 still sees the genesis allocation
        assert_eq!(
            snapshot.generating_balance(&holder, 1),
            Amount::from_raw(500)
        );
    }

    #[test]
    fn wrong_height_application_is_rejected() {
        let keypair = KeyPair::generate();
        let genesis_block = genesis(&keypair);
        let store = MemoryStateStore::new(genesis_block.clone(), Vec::new());
        let block2 = next_block(&genesis_block, &keypair);
        let block3 = next_block(&block2, &keypair);

        let mut txn = store.begin();
        assert!(txn.apply_block(&block3, BlockDiff::default()).is_err());
    }
}
