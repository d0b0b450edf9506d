// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::controller_traits::StateReader;
use crate::error::StateError;
use std::collections::{HashMap, HashSet};
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::data_entry::{DataEntry, DataValue};
use waves_models::scheme::Scheme;
use waves_models::transaction::{Transaction, TransactionId};

/// The net effect of applying one block: final balances of the touched
/// accounts, ordered data writes and confirmed transaction ids.
///
/// Produced by validation and handed unchanged to the state transaction, so
/// every block is applied exactly as it was validated.
#[derive(Debug, Clone, Default)]
pub struct BlockDiff {
    /// absolute post-application balances of every touched address
    pub balances: HashMap<Address, Amount>,
    /// data entries in the order they were written within the block
    pub data_writes: Vec<(Address, DataEntry)>,
    /// ids of the confirmed transactions, in block order
    pub transaction_ids: Vec<TransactionId>,
}

/// Mutable view layered over a read-only snapshot.
///
/// The validator applies each transaction of a candidate block to an overlay
/// so later transactions see the effects of earlier ones, without ever
/// touching the underlying store.
pub struct StateOverlay<'a> {
    base: &'a dyn StateReader,
    scheme: Scheme,
    balances: HashMap<Address, Amount>,
    data: HashMap<(Address, String), Option<DataValue>>,
    data_writes: Vec<(Address, DataEntry)>,
    transaction_ids: Vec<TransactionId>,
    seen_ids: HashSet<TransactionId>,
}

impl<'a> StateOverlay<'a> {
    /// Layer a fresh overlay over a snapshot.
    pub fn new(scheme: Scheme, base: &'a dyn StateReader) -> Self {
        StateOverlay {
            base,
            scheme,
            balances: HashMap::new(),
            data: HashMap::new(),
            data_writes: Vec::new(),
            transaction_ids: Vec::new(),
            seen_ids: HashSet::new(),
        }
    }

    /// Effective balance, staged writes first.
    pub fn balance(&self, address: &Address) -> Amount {
        self.balances
            .get(address)
            .copied()
            .unwrap_or_else(|| self.base.balance(address))
    }

    /// Whether the id is confirmed in the base or staged here.
    pub fn contains_transaction(&self, id: &TransactionId) -> bool {
        self.seen_ids.contains(id) || self.base.contains_transaction(id)
    }

    fn debit(&mut self, address: Address, amount: Amount) -> Result<(), StateError> {
        let current = self.balance(&address);
        let updated = current
            .checked_sub(amount)
            .map_err(|_| StateError::InsufficientFunds(address.to_string()))?;
        self.balances.insert(address, updated);
        Ok(())
    }

    /// Credit an address, saturating at the maximum representable amount.
    pub fn credit(&mut self, address: Address, amount: Amount) {
        let current = self.balance(&address);
        self.balances.insert(address, current.saturating_add(amount));
    }

    fn write_entry(&mut self, address: Address, entry: DataEntry) {
        let staged = match &entry.value {
            DataValue::Delete => None,
            value => Some(value.clone()),
        };
        self.data.insert((address, entry.key.clone()), staged);
        self.data_writes.push((address, entry));
    }

    /// Apply the effects of one transaction: debit fees and moved funds,
    /// write data entries, record the confirmed id.
    ///
    /// Fee amounts are debited from the sender here; crediting the block
    /// generator happens once per block via [`StateOverlay::credit`].
    pub fn apply_transaction(&mut self, transaction: &Transaction) -> Result<(), StateError> {
        let id = transaction.compute_id()?;
        if self.contains_transaction(&id) {
            return Err(StateError::TransactionAlreadyConfirmed(id.to_string()));
        }
        let sender = transaction.sender_address(self.scheme);
        self.debit(sender, transaction.fee())?;
        match transaction {
            Transaction::Transfer(tx) => {
                self.debit(sender, tx.amount)?;
                self.credit(tx.recipient, tx.amount);
            }
            Transaction::Data(tx) => {
                for entry in &tx.entries {
                    self.write_entry(sender, entry.clone());
                }
            }
            Transaction::InvokeScript(tx) => {
                self.debit(sender, tx.payment)?;
                self.credit(tx.dapp, tx.payment);
            }
            // issue and exchange only settle fees at this layer; asset
            // bookkeeping lives in the state store
            Transaction::Issue(_) | Transaction::Exchange(_) => {}
        }
        self.seen_ids.insert(id);
        self.transaction_ids.push(id);
        Ok(())
    }

    /// Digest of the overlaid state, for declared state-root comparison.
    pub fn state_root(&self) -> Hash {
        let mut parts: Vec<Vec<u8>> = Vec::new();
        let mut balance_keys: Vec<&Address> = self.balances.keys().collect();
        balance_keys.sort();
        for address in balance_keys {
            let mut part = address.to_bytes().to_vec();
            part.extend_from_slice(&self.balances[address].to_raw().to_be_bytes());
            parts.push(part);
        }
        let mut base = self.base.state_root().into_bytes().to_vec();
        for part in &parts {
            base.extend_from_slice(part);
        }
        Hash::compute_from(&base)
    }

    /// Finish the overlay into a block diff.
    pub fn into_diff(self) -> BlockDiff {
        BlockDiff {
            balances: self.balances,
            data_writes: self.data_writes,
            transaction_ids: self.transaction_ids,
        }
    }
}

impl StateReader for StateOverlay<'_> {
    fn tip(&self) -> Option<(u64, BlockId)> {
        self.base.tip()
    }

    fn balance(&self, address: &Address) -> Amount {
        StateOverlay::balance(self, address)
    }

    fn generating_balance(&self, address: &Address, depth: u64) -> Amount {
        self.base.generating_balance(address, depth)
    }

    fn data_entry(&self, address: &Address, key: &str) -> Option<DataValue> {
        match self.data.get(&(*address, key.to_string())) {
            Some(staged) => staged.clone(),
            None => self.base.data_entry(address, key),
        }
    }

    fn block_at_height(&self, height: u64) -> Option<Block> {
        self.base.block_at_height(height)
    }

    fn data_entries_at_height(&self, height: u64) -> Vec<(Address, DataEntry)> {
        self.base.data_entries_at_height(height)
    }

    fn contains_transaction(&self, id: &TransactionId) -> bool {
        StateOverlay::contains_transaction(self, id)
    }

    fn state_root(&self) -> Hash {
        StateOverlay::state_root(self)
    }
}
