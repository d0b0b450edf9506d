// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use waves_chain_exports::{BlockGraphStatus, BlockOrigin, ChainController, ChainError};
use waves_hash::Hash;
use waves_models::address::Address;
use waves_models::amount::Amount;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::scheme::Scheme;
use waves_models::transaction::{Transaction, TransactionId, TransferTransaction};
use waves_signature::KeyPair;
use waves_state_exports::StateReader;
use waves_time::WavesTime;
use waves_utx_exports::{AdmissionError, UtxController, UtxStats};

/// How the stub applier behaves on a broadcast command.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(crate) enum BroadcastMode {
    /// reply with an immediate acceptance
    Accept,
    /// sit on a full queue for the whole timeout, then give up
    Stall,
    /// reply with an admission rejection
    Reject,
}

/// A hand-rolled applier stub recording what the router forwards.
#[derive(Clone)]
pub(crate) struct StubChainController {
    pub tip: (u64, BlockId),
    pub mode: BroadcastMode,
    pub registered: Arc<Mutex<Vec<(BlockId, BlockOrigin)>>>,
    pub broadcast_seen: Arc<Mutex<Vec<TransactionId>>>,
}

impl StubChainController {
    pub(crate) fn new(mode: BroadcastMode) -> Self {
        StubChainController {
            tip: (1, BlockId(Hash::compute_from(b"stub-tip"))),
            mode,
            registered: Arc::new(Mutex::new(Vec::new())),
            broadcast_seen: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl ChainController for StubChainController {
    fn register_block(&self, block: Block, origin: BlockOrigin) -> Result<(), ChainError> {
        self.registered.lock().push((block.id, origin));
        Ok(())
    }

    fn rollback(&self, _to_height: u64) -> Result<(), ChainError> {
        Ok(())
    }

    fn broadcast_transaction(
        &self,
        transaction: Transaction,
        reply: crossbeam::channel::Sender<Result<TransactionId, AdmissionError>>,
        timeout: Duration,
    ) -> Result<(), ChainError> {
        let id = transaction.compute_id().expect("stub id");
        match self.mode {
            BroadcastMode::Accept => {
                self.broadcast_seen.lock().push(id);
                let _ = reply.send(Ok(id));
                Ok(())
            }
            BroadcastMode::Stall => {
                std::thread::sleep(timeout);
                Err(ChainError::QueueFull)
            }
            BroadcastMode::Reject => {
                let _ = reply.send(Err(AdmissionError::AlreadyKnown));
                Ok(())
            }
        }
    }

    fn get_tip(&self) -> (u64, BlockId) {
        self.tip
    }

    fn get_block_statuses(&self, ids: &[BlockId]) -> Vec<BlockGraphStatus> {
        ids.iter()
            .map(|id| {
                if *id == self.tip.1 {
                    BlockGraphStatus::Canonical
                } else {
                    BlockGraphStatus::Unknown
                }
            })
            .collect()
    }

    fn get_block_at_height(&self, _height: u64) -> Option<Block> {
        None
    }

    fn clone_box(&self) -> Box<dyn ChainController> {
        Box::new(self.clone())
    }
}

/// A pool stub recording gossip admissions.
#[derive(Clone, Default)]
pub(crate) struct RecordingUtxController {
    pub added: Arc<Mutex<Vec<Transaction>>>,
}

impl UtxController for RecordingUtxController {
    fn admit(
        &self,
        _snapshot: &dyn StateReader,
        transaction: Transaction,
        _now: WavesTime,
    ) -> Result<TransactionId, AdmissionError> {
        let id = transaction.compute_id().expect("stub id");
        self.added.lock().push(transaction);
        Ok(id)
    }

    fn add_transactions(&self, transactions: Vec<Transaction>) {
        self.added.lock().extend(transactions);
    }

    fn remove(&self, _ids: &[TransactionId]) {}

    fn select_for_block(
        &self,
        _snapshot: &dyn StateReader,
        _byte_budget: u64,
        _gas_budget: u64,
    ) -> Vec<Transaction> {
        Vec::new()
    }

    fn contains(&self, _id: &TransactionId) -> bool {
        false
    }

    fn ordered_ids(&self) -> Vec<TransactionId> {
        Vec::new()
    }

    fn stats(&self) -> UtxStats {
        UtxStats::default()
    }

    fn clone_box(&self) -> Box<dyn UtxController> {
        Box::new(self.clone())
    }
}

/// A signed transfer and its self-describing JSON payload.
pub(crate) fn transfer_payload() -> (Transaction, Vec<u8>) {
    let keypair = KeyPair::generate();
    let recipient =
        Address::from_public_key(Scheme::MAINNET, &KeyPair::generate().get_public_key());
    let mut transaction = Transaction::Transfer(TransferTransaction {
        version: 3,
        chain_id: Scheme::MAINNET.to_byte(),
        sender_public_key: keypair.get_public_key(),
        recipient,
        amount: Amount::from_raw(1_00000000),
        fee: Amount::from_raw(10_000_000),
        timestamp: WavesTime::from_millis(1_700_000_000_000),
        attachment: Vec::new(),
        proofs: Vec::new(),
    });
    transaction.sign(&keypair).expect("sign transfer");
    let payload = serde_json::to_vec(&transaction.to_json().expect("encode json"))
        .expect("serialize payload");
    (transaction, payload)
}
