// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::StateError;
use crate::overlay::BlockDiff;
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::data_entry::{DataEntry, DataValue};
use waves_models::transaction::TransactionId;

/// Read-only view of committed (or staged) chain state at a specific height.
///
/// Snapshot handles are passed down from the applier as parameters; no
/// component stores one across commits.
pub trait StateReader: Send + Sync {
    /// Canonical tip as seen by this snapshot, `None` before genesis init.
    fn tip(&self) -> Option<(u64, BlockId)>;

    /// Spendable balance of an address.
    fn balance(&self, address: &Address) -> Amount;

    /// Balance of an address measured `depth` blocks below the tip, used for
    /// proof-of-stake eligibility.
    fn generating_balance(&self, address: &Address, depth: u64) -> Amount;

    /// Current value of an account data key, `None` if absent or deleted.
    fn data_entry(&self, address: &Address, key: &str) -> Option<DataValue>;

    /// Committed block at the given canonical height.
    fn block_at_height(&self, height: u64) -> Option<Block>;

    /// Data entries durably written at the given height, in write order.
    fn data_entries_at_height(&self, height: u64) -> Vec<(Address, DataEntry)>;

    /// Whether a transaction id is already confirmed on the canonical chain.
    fn contains_transaction(&self, id: &TransactionId) -> bool;

    /// Digest of the full snapshot contents, compared against a declared
    /// block state root when present.
    fn state_root(&self) -> Hash;
}

/// An open atomic batch of chain mutations.
///
/// A transaction stages any number of rollbacks and forward applications;
/// nothing is visible to other readers until `commit` returns. A successful
/// commit is durable.
pub trait StateTransaction {
    /// Evolving view including every staged mutation.
    fn reader(&self) -> &dyn StateReader;

    /// Undo the staged tip block, returning it. Fails on genesis.
    fn rollback_block(&mut self) -> Result<Block, StateError>;

    /// Stage a validated block and its application diff on top of the staged
    /// tip.
    fn apply_block(&mut self, block: &Block, diff: BlockDiff) -> Result<(), StateError>;

    /// Atomically publish every staged mutation.
    fn commit(self: Box<Self>) -> Result<(), StateError>;
}

/// Handle on the state store: snapshots and transactions.
pub trait StateStore: Send + Sync {
    /// Read-only snapshot of the latest committed state.
    fn snapshot(&self) -> Box<dyn StateReader>;

    /// Open an atomic mutation batch. The applier is the only caller.
    fn begin(&self) -> Box<dyn StateTransaction + '_>;

    /// Returns a boxed clone of self, to allow cloning `Box<dyn StateStore>`.
    fn clone_box(&self) -> Box<dyn StateStore>;
}

impl Clone for Box<dyn StateStore> {
    fn clone(&self) -> Box<dyn StateStore> {
        self.clone_box()
    }
}
