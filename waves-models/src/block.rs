// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Blocks and block headers.
//!
//! The block id is the Blake2b-256 digest of the canonical header bytes, and
//! the producer signature covers that digest. The header chains proof-of-stake
//! inputs: `generation_signature = H(prev_gen_sig || vrf_output)` where the
//! vrf output is the digest of the deterministic proof signed by the
//! generator.

use crate::block_id::{BlockId, BlockIdDeserializer, BlockIdSerializer};
use crate::config::MAX_TRANSACTIONS_PER_BLOCK;
use crate::error::ModelsError;
use crate::transaction::{Transaction, TransactionDeserializer, TransactionSerializer};
use crate::amount::{Amount, AmountDeserializer, AmountSerializer};
use nom::error::{context, ContextError, ParseError};
use nom::multi::count;
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::ops::Bound::Included;
use waves_hash::{Hash, HashDeserializer, HashSerializer};
use waves_serialization::{
    Deserializer, OptionDeserializer, OptionSerializer, SerializeError, Serializer,
    U16VarIntDeserializer, U16VarIntSerializer, U32VarIntDeserializer, U32VarIntSerializer,
    U64VarIntDeserializer, U64VarIntSerializer,
};
use waves_signature::{
    KeyPair, PublicKey, PublicKeyDeserializer, Signature, SignatureDeserializer,
    SignatureSerializer,
};
use waves_time::{WavesTime, WavesTimeDeserializer, WavesTimeSerializer};

/// Maximum number of activation feature ids a header may carry.
pub const MAX_FEATURES_PER_BLOCK: u32 = 64;

/// A block header: everything that enters the block id and the producer
/// signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    /// position on the canonical chain, genesis is 1
    pub height: u64,
    /// production timestamp, milliseconds
    pub timestamp: WavesTime,
    /// id of the block at `height - 1`
    pub parent_id: BlockId,
    /// proof-of-stake difficulty input
    pub base_target: u64,
    /// chained randomness: `H(prev_gen_sig || vrf_output)`
    pub generation_signature: Hash,
    /// deterministic vrf proof signed by the generator
    pub vrf_proof: Signature,
    /// activation feature ids voted by the generator
    pub features: Vec<u16>,
    /// generation reward claimed by this block
    pub reward: Amount,
    /// block producer public key
    pub generator: PublicKey,
    /// declared state root after application, when the protocol requires one
    pub state_root: Option<Hash>,
}

impl BlockHeader {
    /// The verifiable randomness output: digest of the proof.
    pub fn vrf_output(&self) -> Hash {
        Hash::compute_from(&self.vrf_proof.to_bytes())
    }
}

/// A block: header, transactions and the producer signature over the header
/// digest. `id` caches the header digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// the signed header
    pub header: BlockHeader,
    /// transactions in application order
    pub transactions: Vec<Transaction>,
    /// producer signature over the header digest
    pub signature: Signature,
    /// cached header digest
    pub id: BlockId,
}

impl Block {
    /// Digest of the canonical header bytes.
    pub fn compute_id(header: &BlockHeader) -> Result<BlockId, ModelsError> {
        let mut buffer = Vec::new();
        BlockHeaderSerializer::new().serialize(header, &mut buffer)?;
        Ok(BlockId(Hash::compute_from(&buffer)))
    }

    /// Build and sign a block with the generator keypair.
    pub fn new_signed(
        header: BlockHeader,
        transactions: Vec<Transaction>,
        keypair: &KeyPair,
    ) -> Result<Block, ModelsError> {
        let id = Block::compute_id(&header)?;
        let signature = keypair.sign(&id.0)?;
        Ok(Block {
            header,
            transactions,
            signature,
            id,
        })
    }

    /// Check that the cached id matches the header and that the producer
    /// signature verifies against the generator key.
    pub fn verify_signature(&self) -> Result<(), ModelsError> {
        let id = Block::compute_id(&self.header)?;
        if id != self.id {
            return Err(ModelsError::HashError);
        }
        self.header
            .generator
            .verify_signature(&id.0, &self.signature)
            .map_err(ModelsError::from)
    }

    /// Ids of the contained transactions, in block order.
    pub fn transaction_ids(&self) -> Result<Vec<crate::transaction::TransactionId>, ModelsError> {
        self.transactions
            .iter()
            .map(|transaction| transaction.compute_id())
            .collect()
    }

    /// Sum of the contained transaction fees.
    pub fn total_fees(&self) -> Amount {
        self.transactions
            .iter()
            .fold(Amount::ZERO, |acc, transaction| {
                acc.saturating_add(transaction.fee())
            })
    }
}

/// A microblock extending the liquid tip between key blocks.
///
/// The core consumes only the transactions: the router checks the reference
/// against the canonical tip and admits them to the UTX pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Microblock {
    /// id of the key block this microblock extends
    pub reference: BlockId,
    /// carried transactions
    pub transactions: Vec<Transaction>,
    /// producing generator
    pub generator: PublicKey,
    /// generator signature over the reference and transaction ids
    pub signature: Signature,
}

impl Microblock {
    fn signing_digest(&self) -> Result<Hash, ModelsError> {
        let mut parts: Vec<&[u8]> = vec![self.reference.to_bytes()];
        let ids = self
            .transactions
            .iter()
            .map(|transaction| transaction.compute_id())
            .collect::<Result<Vec<_>, _>>()?;
        let id_bytes: Vec<[u8; 32]> = ids.iter().map(|id| *id.0.to_bytes()).collect();
        for bytes in &id_bytes {
            parts.push(bytes);
        }
        Ok(Hash::compute_from_tuple(&parts))
    }

    /// Build and sign a microblock.
    pub fn new_signed(
        reference: BlockId,
        transactions: Vec<Transaction>,
        keypair: &KeyPair,
    ) -> Result<Microblock, ModelsError> {
        let mut microblock = Microblock {
            reference,
            transactions,
            generator: keypair.get_public_key(),
            signature: keypair.sign(&Hash::compute_from(&[]))?,
        };
        microblock.signature = keypair.sign(&microblock.signing_digest()?)?;
        Ok(microblock)
    }

    /// Verify the generator signature.
    pub fn verify_signature(&self) -> Result<(), ModelsError> {
        self.generator
            .verify_signature(&self.signing_digest()?, &self.signature)
            .map_err(ModelsError::from)
    }
}

/// Serializer for `BlockHeader`: the canonical pre-image of the block id.
#[derive(Clone)]
pub struct BlockHeaderSerializer {
    u64_serializer: U64VarIntSerializer,
    u16_serializer: U16VarIntSerializer,
    u32_serializer: U32VarIntSerializer,
    time_serializer: WavesTimeSerializer,
    block_id_serializer: BlockIdSerializer,
    hash_serializer: HashSerializer,
    signature_serializer: SignatureSerializer,
    amount_serializer: AmountSerializer,
    state_root_serializer: OptionSerializer<Hash, HashSerializer>,
}

impl BlockHeaderSerializer {
    /// Creates a new serializer for `BlockHeader`
    pub fn new() -> Self {
        Self {
            u64_serializer: U64VarIntSerializer::new(),
            u16_serializer: U16VarIntSerializer::new(),
            u32_serializer: U32VarIntSerializer::new(),
            time_serializer: WavesTimeSerializer::new(),
            block_id_serializer: BlockIdSerializer::new(),
            hash_serializer: HashSerializer::new(),
            signature_serializer: SignatureSerializer::new(),
            amount_serializer: AmountSerializer::new(),
            state_root_serializer: OptionSerializer::new(HashSerializer::new()),
        }
    }
}

impl Default for BlockHeaderSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<BlockHeader> for BlockHeaderSerializer {
    fn serialize(&self, value: &BlockHeader, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.u64_serializer.serialize(&value.height, buffer)?;
        self.time_serializer.serialize(&value.timestamp, buffer)?;
        self.block_id_serializer
            .serialize(&value.parent_id, buffer)?;
        self.u64_serializer.serialize(&value.base_target, buffer)?;
        self.hash_serializer
            .serialize(&value.generation_signature, buffer)?;
        self.signature_serializer
            .serialize(&value.vrf_proof, buffer)?;
        self.u32_serializer
            .serialize(&(value.features.len() as u32), buffer)?;
        for feature in &value.features {
            self.u16_serializer.serialize(feature, buffer)?;
        }
        self.amount_serializer.serialize(&value.reward, buffer)?;
        buffer.extend(value.generator.to_bytes());
        self.state_root_serializer
            .serialize(&value.state_root, buffer)?;
        Ok(())
    }
}

/// Deserializer for `BlockHeader`
#[derive(Clone)]
pub struct BlockHeaderDeserializer {
    u64_deserializer: U64VarIntDeserializer,
    u16_deserializer: U16VarIntDeserializer,
    features_length_deserializer: U32VarIntDeserializer,
    time_deserializer: WavesTimeDeserializer,
    block_id_deserializer: BlockIdDeserializer,
    hash_deserializer: HashDeserializer,
    signature_deserializer: SignatureDeserializer,
    amount_deserializer: AmountDeserializer,
    public_key_deserializer: PublicKeyDeserializer,
    state_root_deserializer: OptionDeserializer<Hash, HashDeserializer>,
}

impl BlockHeaderDeserializer {
    /// Creates a new deserializer for `BlockHeader`
    pub fn new() -> Self {
        Self {
            u64_deserializer: U64VarIntDeserializer::new(Included(0), Included(u64::MAX)),
            u16_deserializer: U16VarIntDeserializer::new(Included(0), Included(u16::MAX)),
            features_length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_FEATURES_PER_BLOCK),
            ),
            time_deserializer: WavesTimeDeserializer::new((
                Included(WavesTime::ZERO),
                Included(WavesTime::from_millis(u64::MAX)),
            )),
            block_id_deserializer: BlockIdDeserializer::new(),
            hash_deserializer: HashDeserializer::new(),
            signature_deserializer: SignatureDeserializer::new(),
            amount_deserializer: AmountDeserializer::new(),
            public_key_deserializer: PublicKeyDeserializer::new(),
            state_root_deserializer: OptionDeserializer::new(HashDeserializer::new()),
        }
    }
}

impl Default for BlockHeaderDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer<BlockHeader> for BlockHeaderDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], BlockHeader, E> {
        context("Failed block header deserialization", |input: &'a [u8]| {
            let (rest, height) = self.u64_deserializer.deserialize(input)?;
            let (rest, timestamp) = self.time_deserializer.deserialize(rest)?;
            let (rest, parent_id) = self.block_id_deserializer.deserialize(rest)?;
            let (rest, base_target) = self.u64_deserializer.deserialize(rest)?;
            let (rest, generation_signature) = self.hash_deserializer.deserialize(rest)?;
            let (rest, vrf_proof) = self.signature_deserializer.deserialize(rest)?;
            let (rest, feature_count) = self.features_length_deserializer.deserialize(rest)?;
            let (rest, features) = count(
                |input| self.u16_deserializer.deserialize(input),
                feature_count as usize,
            )(rest)?;
            let (rest, reward) = self.amount_deserializer.deserialize(rest)?;
            let (rest, generator) = self.public_key_deserializer.deserialize(rest)?;
            let (rest, state_root) = self.state_root_deserializer.deserialize(rest)?;
            Ok((
                rest,
                BlockHeader {
                    height,
                    timestamp,
                    parent_id,
                    base_target,
                    generation_signature,
                    vrf_proof,
                    features,
                    reward,
                    generator,
                    state_root,
                },
            ))
        })(buffer)
    }
}

/// Serializer for `Block`
#[derive(Clone)]
pub struct BlockSerializer {
    header_serializer: BlockHeaderSerializer,
    signature_serializer: SignatureSerializer,
    u32_serializer: U32VarIntSerializer,
    transaction_serializer: TransactionSerializer,
}

impl BlockSerializer {
    /// Creates a new serializer for `Block`
    pub fn new() -> Self {
        Self {
            header_serializer: BlockHeaderSerializer::new(),
            signature_serializer: SignatureSerializer::new(),
            u32_serializer: U32VarIntSerializer::new(),
            transaction_serializer: TransactionSerializer::new(),
        }
    }
}

impl Default for BlockSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<Block> for BlockSerializer {
    fn serialize(&self, value: &Block, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.header_serializer.serialize(&value.header, buffer)?;
        self.signature_serializer
            .serialize(&value.signature, buffer)?;
        self.u32_serializer
            .serialize(&(value.transactions.len() as u32), buffer)?;
        for transaction in &value.transactions {
            self.transaction_serializer.serialize(transaction, buffer)?;
        }
        Ok(())
    }
}

/// Deserializer for `Block`
#[derive(Clone)]
pub struct BlockDeserializer {
    header_deserializer: BlockHeaderDeserializer,
    signature_deserializer: SignatureDeserializer,
    transactions_length_deserializer: U32VarIntDeserializer,
    transaction_deserializer: TransactionDeserializer,
}

impl BlockDeserializer {
    /// Creates a new deserializer for `Block`
    pub fn new() -> Self {
        Self {
            header_deserializer: BlockHeaderDeserializer::new(),
            signature_deserializer: SignatureDeserializer::new(),
            transactions_length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_TRANSACTIONS_PER_BLOCK),
            ),
            transaction_deserializer: TransactionDeserializer::new(),
        }
    }
}

impl Default for BlockDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer<Block> for BlockDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Block, E> {
        context("Failed block deserialization", |input: &'a [u8]| {
            let (rest, header) = self.header_deserializer.deserialize(input)?;
            let (rest, signature) = self.signature_deserializer.deserialize(rest)?;
            let (rest, transaction_count) =
                self.transactions_length_deserializer.deserialize(rest)?;
            let (rest, transactions) = count(
                |input| self.transaction_deserializer.deserialize(input),
                transaction_count as usize,
            )(rest)?;
            let id = Block::compute_id(&header).map_err(|_| {
                nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::Fail,
                ))
            })?;
            Ok((
                rest,
                Block {
                    header,
                    transactions,
                    signature,
                    id,
                },
            ))
        })(buffer)
    }
}
