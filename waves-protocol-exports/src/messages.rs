// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::ProtocolError;
use crossbeam::channel::Sender;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use waves_models::block::{Block, Microblock};
use waves_models::block_id::BlockId;
use waves_models::transaction::Transaction;

/// Typed inbound messages handed to the router by the peer manager and the
/// admin surface.
#[derive(Clone)]
pub enum Message {
    /// a peer advertises a block id
    BlockAnnouncement(BlockId),
    /// a peer delivers a full block
    BlockBody(Block),
    /// gossiped unconfirmed transactions
    TransactionBroadcast(Vec<Transaction>),
    /// a liquid-tip extension
    Microblock(Microblock),
    /// an admin broadcast with its single-use reply channel
    AdminBroadcastTransaction {
        /// presented API key
        api_key: String,
        /// self-describing JSON transaction payload
        payload: Vec<u8>,
        /// single-use verdict channel
        reply: Sender<Result<Transaction, ProtocolError>>,
    },
}

impl From<Block> for Message {
    fn from(block: Block) -> Self {
        Message::BlockBody(block)
    }
}

impl From<Microblock> for Message {
    fn from(microblock: Microblock) -> Self {
        Message::Microblock(microblock)
    }
}

impl From<Vec<Transaction>> for Message {
    fn from(transactions: Vec<Transaction>) -> Self {
        Message::TransactionBroadcast(transactions)
    }
}

/// Wire category of an inbound message.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u64)]
pub enum MessageCategoryId {
    /// block announcements and bodies
    Block = 0,
    /// transaction gossip
    Transaction = 1,
    /// microblocks
    Microblock = 2,
    /// admin surface
    Admin = 3,
}

impl Message {
    /// Wire category of this message.
    pub fn category(&self) -> MessageCategoryId {
        match self {
            Message::BlockAnnouncement(_) | Message::BlockBody(_) => MessageCategoryId::Block,
            Message::TransactionBroadcast(_) => MessageCategoryId::Transaction,
            Message::Microblock(_) => MessageCategoryId::Microblock,
            Message::AdminBroadcastTransaction { .. } => MessageCategoryId::Admin,
        }
    }
}
