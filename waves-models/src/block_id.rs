// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::ModelsError;
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;
use waves_hash::{Hash, HashDeserializer, HashSerializer};
use waves_serialization::{Deserializer, SerializeError, Serializer};

/// Size in bytes of a serialized block id.
pub const BLOCK_ID_SIZE_BYTES: usize = waves_hash::HASH_SIZE_BYTES;

/// block id: Blake2b-256 of the canonical header bytes
#[derive(
    Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct BlockId(pub Hash);

const BLOCKID_PREFIX: char = 'B';

impl std::fmt::Display for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", BLOCKID_PREFIX, self.0.to_bs58_check())
    }
}

impl std::fmt::Debug for BlockId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for BlockId {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == BLOCKID_PREFIX => {
                let data = chars.collect::<String>();
                Ok(BlockId(
                    Hash::from_bs58_check(&data).map_err(|_| ModelsError::BlockIdParseError)?,
                ))
            }
            _ => Err(ModelsError::BlockIdParseError),
        }
    }
}

impl BlockId {
    /// block id to bytes
    pub fn to_bytes(&self) -> &[u8; BLOCK_ID_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// block id into bytes
    pub fn into_bytes(self) -> [u8; BLOCK_ID_SIZE_BYTES] {
        self.0.into_bytes()
    }

    /// block id from bytes
    pub fn from_bytes(data: &[u8; BLOCK_ID_SIZE_BYTES]) -> BlockId {
        BlockId(Hash::from_bytes(data))
    }
}

/// Serializer for `BlockId`
#[derive(Default, Clone)]
pub struct BlockIdSerializer {
    hash_serializer: HashSerializer,
}

impl BlockIdSerializer {
    /// Creates a new serializer for `BlockId`
    pub const fn new() -> Self {
        Self {
            hash_serializer: HashSerializer::new(),
        }
    }
}

impl Serializer<BlockId> for BlockIdSerializer {
    fn serialize(&self, value: &BlockId, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.hash_serializer.serialize(&value.0, buffer)
    }
}

/// Deserializer for `BlockId`
#[derive(Default, Clone)]
pub struct BlockIdDeserializer {
    hash_deserializer: HashDeserializer,
}

impl BlockIdDeserializer {
    /// Creates a new deserializer for `BlockId`
    pub const fn new() -> Self {
        Self {
            hash_deserializer: HashDeserializer::new(),
        }
    }
}

impl Deserializer<BlockId> for BlockIdDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], BlockId, E> {
        context("Failed block id deserialization", |input| {
            let (rest, hash) = self.hash_deserializer.deserialize(input)?;
            Ok((rest, BlockId(hash)))
        })(buffer)
    }
}
