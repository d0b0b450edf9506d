// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Wire records pushed to L2 subscribers.
//!
//! Field numbers are frozen for compatibility with deployed subscribers:
//! `BlockInfo { height=1, vrf=2, block_id=3, block_header=4 }` and
//! `L2ContractDataEntries { height=1, block_id=2, data_entries=5 }`.
//! Records are framed as a kind byte followed by the prost length-delimited
//! message body.

use crate::error::FeedError;
use prost::Message;
use waves_models::address::Address;
use waves_models::block::Block;
use waves_models::block_id::BlockId;
use waves_models::data_entry::{DataEntry, DataValue};

/// Header fields mirrored onto the wire.
#[derive(Clone, PartialEq, Message)]
pub struct BlockHeaderRecord {
    /// canonical height
    #[prost(uint64, tag = "1")]
    pub height: u64,
    /// production timestamp, milliseconds
    #[prost(uint64, tag = "2")]
    pub timestamp: u64,
    /// parent block id bytes
    #[prost(bytes = "vec", tag = "3")]
    pub parent_id: Vec<u8>,
    /// proof-of-stake difficulty input
    #[prost(uint64, tag = "4")]
    pub base_target: u64,
    /// chained randomness
    #[prost(bytes = "vec", tag = "5")]
    pub generation_signature: Vec<u8>,
    /// activation feature votes
    #[prost(uint32, repeated, tag = "6")]
    pub features: Vec<u32>,
    /// claimed generation reward, indivisible units
    #[prost(uint64, tag = "7")]
    pub reward: u64,
    /// generator public key bytes
    #[prost(bytes = "vec", tag = "8")]
    pub generator: Vec<u8>,
}

/// One committed block, pushed exactly once per canonical height.
#[derive(Clone, PartialEq, Message)]
pub struct BlockInfoRecord {
    /// canonical height
    #[prost(uint64, tag = "1")]
    pub height: u64,
    /// verifiable randomness output of the block
    #[prost(bytes = "vec", tag = "2")]
    pub vrf: Vec<u8>,
    /// block id bytes
    #[prost(bytes = "vec", tag = "3")]
    pub block_id: Vec<u8>,
    /// mirrored header fields
    #[prost(message, optional, tag = "4")]
    pub block_header: Option<BlockHeaderRecord>,
}

/// Typed value of a pushed data entry. An absent value is a tombstone.
#[derive(Clone, PartialEq, prost::Oneof)]
pub enum DataEntryValue {
    /// 64-bit signed integer
    #[prost(int64, tag = "3")]
    IntValue(i64),
    /// boolean flag
    #[prost(bool, tag = "4")]
    BoolValue(bool),
    /// raw bytes
    #[prost(bytes, tag = "5")]
    BinaryValue(Vec<u8>),
    /// UTF-8 string
    #[prost(string, tag = "6")]
    StringValue(String),
}

/// One durably written data entry.
#[derive(Clone, PartialEq, Message)]
pub struct DataEntryRecord {
    /// owning contract address bytes
    #[prost(bytes = "vec", tag = "1")]
    pub address: Vec<u8>,
    /// entry key
    #[prost(string, tag = "2")]
    pub key: String,
    /// entry value; absent for a tombstone
    #[prost(oneof = "DataEntryValue", tags = "3, 4, 5, 6")]
    pub value: Option<DataEntryValue>,
}

/// Contract data written at one height, in write order.
#[derive(Clone, PartialEq, Message)]
pub struct L2ContractDataEntriesRecord {
    /// canonical height
    #[prost(uint64, tag = "1")]
    pub height: u64,
    /// block id bytes
    #[prost(bytes = "vec", tag = "2")]
    pub block_id: Vec<u8>,
    /// ordered entry writes
    #[prost(message, repeated, tag = "5")]
    pub data_entries: Vec<DataEntryRecord>,
}

/// Canonical chain regressed to `height`.
#[derive(Clone, PartialEq, Message)]
pub struct RollbackRecord {
    /// tip height after the regression step
    #[prost(uint64, tag = "1")]
    pub height: u64,
}

const KIND_BLOCK_INFO: u8 = 1;
const KIND_DATA_ENTRIES: u8 = 2;
const KIND_ROLLBACK: u8 = 3;

/// A feed record, in delivery order.
#[derive(Clone, PartialEq, Debug)]
pub enum FeedRecord {
    /// one committed block
    BlockInfo(BlockInfoRecord),
    /// its contract data writes
    DataEntries(L2ContractDataEntriesRecord),
    /// a regression step
    Rollback(RollbackRecord),
}

impl FeedRecord {
    /// Height the record refers to.
    pub fn height(&self) -> u64 {
        match self {
            FeedRecord::BlockInfo(record) => record.height,
            FeedRecord::DataEntries(record) => record.height,
            FeedRecord::Rollback(record) => record.height,
        }
    }

    /// Frame the record: kind byte plus length-delimited message body.
    pub fn encode_framed(&self, buffer: &mut Vec<u8>) -> Result<(), FeedError> {
        match self {
            FeedRecord::BlockInfo(record) => {
                buffer.push(KIND_BLOCK_INFO);
                record
                    .encode_length_delimited(buffer)
                    .map_err(|err| FeedError::WireError(err.to_string()))
            }
            FeedRecord::DataEntries(record) => {
                buffer.push(KIND_DATA_ENTRIES);
                record
                    .encode_length_delimited(buffer)
                    .map_err(|err| FeedError::WireError(err.to_string()))
            }
            FeedRecord::Rollback(record) => {
                buffer.push(KIND_ROLLBACK);
                record
                    .encode_length_delimited(buffer)
                    .map_err(|err| FeedError::WireError(err.to_string()))
            }
        }
    }

    /// Decode one framed record, returning it and the bytes consumed.
    pub fn decode_framed(buffer: &[u8]) -> Result<(FeedRecord, usize), FeedError> {
        let kind = *buffer
            .first()
            .ok_or_else(|| FeedError::WireError("empty frame".into()))?;
        let body = &buffer[1..];
        let before = body.len();
        match kind {
            KIND_BLOCK_INFO => {
                let mut slice = body;
                let record = BlockInfoRecord::decode_length_delimited(&mut slice)
                    .map_err(|err| FeedError::WireError(err.to_string()))?;
                Ok((FeedRecord::BlockInfo(record), 1 + before - slice.len()))
            }
            KIND_DATA_ENTRIES => {
                let mut slice = body;
                let record = L2ContractDataEntriesRecord::decode_length_delimited(&mut slice)
                    .map_err(|err| FeedError::WireError(err.to_string()))?;
                Ok((FeedRecord::DataEntries(record), 1 + before - slice.len()))
            }
            KIND_ROLLBACK => {
                let mut slice = body;
                let record = RollbackRecord::decode_length_delimited(&mut slice)
                    .map_err(|err| FeedError::WireError(err.to_string()))?;
                Ok((FeedRecord::Rollback(record), 1 + before - slice.len()))
            }
            other => Err(FeedError::WireError(format!("unknown record kind {}", other))),
        }
    }
}

impl BlockInfoRecord {
    /// Mirror a committed block onto the wire.
    pub fn from_block(block: &Block) -> Self {
        BlockInfoRecord {
            height: block.header.height,
            vrf: block.header.vrf_output().to_bytes().to_vec(),
            block_id: block.id.to_bytes().to_vec(),
            block_header: Some(BlockHeaderRecord {
                height: block.header.height,
                timestamp: block.header.timestamp.to_millis(),
                parent_id: block.header.parent_id.to_bytes().to_vec(),
                base_target: block.header.base_target,
                generation_signature: block.header.generation_signature.to_bytes().to_vec(),
                features: block.header.features.iter().map(|f| *f as u32).collect(),
                reward: block.header.reward.to_raw(),
                generator: block.header.generator.to_bytes().to_vec(),
            }),
        }
    }
}

impl L2ContractDataEntriesRecord {
    /// Mirror the ordered data writes of a committed block onto the wire.
    pub fn from_block_data(
        height: u64,
        block_id: &BlockId,
        data_writes: &[(Address, DataEntry)],
    ) -> Self {
        L2ContractDataEntriesRecord {
            height,
            block_id: block_id.to_bytes().to_vec(),
            data_entries: data_writes
                .iter()
                .map(|(address, entry)| DataEntryRecord {
                    address: address.to_bytes().to_vec(),
                    key: entry.key.clone(),
                    value: match &entry.value {
                        DataValue::Integer(int) => Some(DataEntryValue::IntValue(*int)),
                        DataValue::Boolean(flag) => Some(DataEntryValue::BoolValue(*flag)),
                        DataValue::Binary(bytes) => {
                            Some(DataEntryValue::BinaryValue(bytes.clone()))
                        }
                        DataValue::String(text) => {
                            Some(DataEntryValue::StringValue(text.clone()))
                        }
                        DataValue::Delete => None,
                    },
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waves_hash::Hash;
    use waves_models::block::BlockHeader;
    use waves_models::config::BLOCK_REWARD;
    use waves_signature::KeyPair;
    use waves_time::WavesTime;

    fn block_fixture() -> Block {
        let keypair = KeyPair::generate();
        let seed = Hash::compute_from(b"feed-record-seed");
        let vrf_proof = keypair.sign(&seed).unwrap();
        let header = BlockHeader {
            height: 7,
            timestamp: WavesTime::from_millis(1_700_000_000_000),
            parent_id: BlockId(Hash::compute_from(b"parent")),
            base_target: 1_000,
            generation_signature: seed,
            vrf_proof,
            features: vec![14],
            reward: BLOCK_REWARD,
            generator: keypair.get_public_key(),
            state_root: None,
        };
        Block::new_signed(header, Vec::new(), &keypair).unwrap()
    }

    #[test]
    fn block_info_pins_field_numbers() {
        let block = block_fixture();
        let record = BlockInfoRecord::from_block(&block);
        let bytes = record.encode_to_vec();
        // protobuf keys: (field << 3) | wire_type
        assert_eq!(bytes[0], 0x08u8, "height must be field 1, varint");
        let mut offset = 1;
        while bytes[offset] & 0x80 != 0 {
            offset += 1;
        }
        offset += 1;
        assert_eq!(
            bytes[offset], 0x12u8,
            "vrf must be field 2, length-delimited"
        );
    }

    #[test]
    fn framed_round_trip() {
        let block = block_fixture();
        let records = vec![
            FeedRecord::Rollback(RollbackRecord { height: 6 }),
            FeedRecord::BlockInfo(BlockInfoRecord::from_block(&block)),
            FeedRecord::DataEntries(L2ContractDataEntriesRecord::from_block_data(
                7,
                &block.id,
                &[(
                    Address::from_public_key(
                        waves_models::scheme::Scheme::MAINNET,
                        &KeyPair::generate().get_public_key(),
                    ),
                    DataEntry {
                        key: "bridge".into(),
                        value: DataValue::Integer(7),
                    },
                )],
            )),
        ];
        let mut buffer = Vec::new();
        for record in &records {
            record.encode_framed(&mut buffer).unwrap();
        }
        let mut decoded = Vec::new();
        let mut rest = buffer.as_slice();
        while !rest.is_empty() {
            let (record, consumed) = FeedRecord::decode_framed(rest).unwrap();
            decoded.push(record);
            rest = &rest[consumed..];
        }
        assert_eq!(records, decoded);
    }

    #[test]
    fn tombstones_have_no_value() {
        let record = L2ContractDataEntriesRecord::from_block_data(
            3,
            &BlockId(Hash::compute_from(b"id")),
            &[(
                Address(Hash::compute_from(b"addr")),
                DataEntry {
                    key: "stale".into(),
                    value: DataValue::Delete,
                },
            )],
        );
        assert!(record.data_entries[0].value.is_none());
    }
}
