// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Transaction sum type across the known versioned variants.
//!
//! Every variant carries a sender public key, a timestamp, a fee, an explicit
//! chain id and a proof list bound to the canonical body serialization. The
//! identifier is the Blake2b-256 digest of the canonical body bytes (proofs
//! excluded).

use crate::address::{Address, AddressDeserializer, AddressSerializer};
use crate::amount::{Amount, AmountDeserializer, AmountSerializer};
use crate::data_entry::{
    serde_bytes_bs58, DataEntry, DataEntryDeserializer, DataEntrySerializer, DataValue,
};
use crate::error::ModelsError;
use crate::scheme::Scheme;
use nom::error::{context, ContextError, ParseError};
use nom::multi::count;
use nom::IResult;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::ops::Bound::Included;
use std::str::FromStr;
use waves_hash::Hash;
use waves_serialization::{
    Deserializer, SerializeError, Serializer, U32VarIntDeserializer, U32VarIntSerializer,
};
use waves_signature::{
    PublicKey, PublicKeyDeserializer, Signature, SignatureDeserializer, SignatureSerializer,
};
use waves_time::{WavesTime, WavesTimeDeserializer, WavesTimeSerializer};

/// Maximum serialized transaction size accepted anywhere in the node.
pub const MAX_TRANSACTION_SIZE_BYTES: usize = 150 * 1024;
/// Maximum number of proofs on a transaction.
pub const MAX_PROOFS: usize = 8;
/// Maximum number of data entries in a data transaction.
pub const MAX_DATA_ENTRIES_PER_TRANSACTION: usize = 100;
/// Maximum byte length of an invoke function name.
pub const MAX_FUNCTION_NAME_BYTES: usize = 255;
/// Maximum number of invoke call arguments.
pub const MAX_INVOKE_ARGS: usize = 22;

/// transaction id: Blake2b-256 of the canonical body bytes
#[derive(
    Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct TransactionId(pub Hash);

const TRANSACTION_ID_PREFIX: char = 'T';

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", TRANSACTION_ID_PREFIX, self.0.to_bs58_check())
    }
}

impl std::fmt::Debug for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for TransactionId {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == TRANSACTION_ID_PREFIX => {
                let data = chars.collect::<String>();
                Ok(TransactionId(
                    Hash::from_bs58_check(&data)
                        .map_err(|_| ModelsError::TransactionIdParseError)?,
                ))
            }
            _ => Err(ModelsError::TransactionIdParseError),
        }
    }
}

/// Transaction type tag, matching the on-wire and JSON `type` field.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, IntoPrimitive, TryFromPrimitive, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum TransactionType {
    /// asset issue
    Issue = 3,
    /// token transfer
    Transfer = 4,
    /// matcher-settled exchange
    Exchange = 7,
    /// account data write
    Data = 12,
    /// dApp invocation
    InvokeScript = 16,
}

/// The self-describing `{"type": .., "version": ..}` prefix of a JSON
/// transaction payload, decoded before the concrete variant is known.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct TransactionTypeVersion {
    /// transaction type tag
    #[serde(rename = "type")]
    pub tx_type: u8,
    /// variant version
    #[serde(default = "default_version")]
    pub version: u8,
}

fn default_version() -> u8 {
    1
}

/// Identify the concrete variant from a type+version tag.
pub fn guess_transaction_type(
    tag: &TransactionTypeVersion,
) -> Result<TransactionType, ModelsError> {
    let tx_type = TransactionType::try_from(tag.tx_type)
        .map_err(|_| ModelsError::UnknownTransactionType(tag.tx_type, tag.version))?;
    let max_version = match tx_type {
        TransactionType::Issue | TransactionType::Transfer | TransactionType::Exchange => 3,
        TransactionType::Data => 2,
        TransactionType::InvokeScript => 2,
    };
    if tag.version == 0 || tag.version > max_version {
        return Err(ModelsError::UnknownTransactionType(tag.tx_type, tag.version));
    }
    Ok(tx_type)
}

/// Token transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferTransaction {
    /// variant version
    pub version: u8,
    /// chain id byte
    pub chain_id: u8,
    /// sender public key
    pub sender_public_key: PublicKey,
    /// funds recipient
    pub recipient: Address,
    /// transferred amount
    pub amount: Amount,
    /// fee paid to the block generator
    pub fee: Amount,
    /// sender-declared timestamp, milliseconds
    pub timestamp: WavesTime,
    /// opaque attachment bytes
    #[serde(with = "serde_bytes_bs58", default)]
    pub attachment: Vec<u8>,
    /// signature proofs over the canonical body
    #[serde(default)]
    pub proofs: Vec<Signature>,
}

/// Asset issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTransaction {
    /// variant version
    pub version: u8,
    /// chain id byte
    pub chain_id: u8,
    /// sender public key
    pub sender_public_key: PublicKey,
    /// asset name
    pub name: String,
    /// asset description
    pub description: String,
    /// issued quantity in indivisible units
    pub quantity: u64,
    /// number of decimal places
    pub decimals: u8,
    /// whether more units may be issued later
    pub reissuable: bool,
    /// fee paid to the block generator
    pub fee: Amount,
    /// sender-declared timestamp, milliseconds
    pub timestamp: WavesTime,
    /// signature proofs over the canonical body
    #[serde(default)]
    pub proofs: Vec<Signature>,
}

/// Account data write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataTransaction {
    /// variant version
    pub version: u8,
    /// chain id byte
    pub chain_id: u8,
    /// sender public key
    pub sender_public_key: PublicKey,
    /// ordered entry writes
    pub entries: Vec<DataEntry>,
    /// fee paid to the block generator
    pub fee: Amount,
    /// sender-declared timestamp, milliseconds
    pub timestamp: WavesTime,
    /// signature proofs over the canonical body
    #[serde(default)]
    pub proofs: Vec<Signature>,
}

/// Side of an exchange order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    /// buying the amount asset
    Buy,
    /// selling the amount asset
    Sell,
}

/// A signed order settled by an exchange transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    /// order owner public key
    pub sender_public_key: PublicKey,
    /// buy or sell
    pub side: OrderSide,
    /// traded amount in indivisible units
    pub amount: u64,
    /// price in indivisible price-asset units
    pub price: u64,
    /// order creation timestamp
    pub timestamp: WavesTime,
    /// order expiration timestamp
    pub expiration: WavesTime,
    /// owner signature
    pub signature: Signature,
}

/// Matcher-settled exchange of two counter orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeTransaction {
    /// variant version
    pub version: u8,
    /// chain id byte
    pub chain_id: u8,
    /// matcher public key
    pub sender_public_key: PublicKey,
    /// buy side order
    pub buy_order: Order,
    /// sell side order
    pub sell_order: Order,
    /// settled amount
    pub amount: u64,
    /// settled price
    pub price: u64,
    /// fee paid to the block generator
    pub fee: Amount,
    /// matcher-declared timestamp, milliseconds
    pub timestamp: WavesTime,
    /// signature proofs over the canonical body
    #[serde(default)]
    pub proofs: Vec<Signature>,
}

/// dApp invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvokeScriptTransaction {
    /// variant version
    pub version: u8,
    /// chain id byte
    pub chain_id: u8,
    /// sender public key
    pub sender_public_key: PublicKey,
    /// invoked contract address
    pub dapp: Address,
    /// called function name
    pub function: String,
    /// call arguments
    #[serde(default)]
    pub args: Vec<DataValue>,
    /// attached payment
    pub payment: Amount,
    /// fee paid to the block generator
    pub fee: Amount,
    /// sender-declared timestamp, milliseconds
    pub timestamp: WavesTime,
    /// signature proofs over the canonical body
    #[serde(default)]
    pub proofs: Vec<Signature>,
}

/// Sum type over the known transaction variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transaction {
    /// token transfer
    Transfer(TransferTransaction),
    /// asset issue
    Issue(IssueTransaction),
    /// account data write
    Data(DataTransaction),
    /// matcher-settled exchange
    Exchange(ExchangeTransaction),
    /// dApp invocation
    InvokeScript(InvokeScriptTransaction),
}

impl Transaction {
    /// Type tag of the concrete variant.
    pub fn tx_type(&self) -> TransactionType {
        match self {
            Transaction::Transfer(_) => TransactionType::Transfer,
            Transaction::Issue(_) => TransactionType::Issue,
            Transaction::Data(_) => TransactionType::Data,
            Transaction::Exchange(_) => TransactionType::Exchange,
            Transaction::InvokeScript(_) => TransactionType::InvokeScript,
        }
    }

    /// Variant version.
    pub fn version(&self) -> u8 {
        match self {
            Transaction::Transfer(tx) => tx.version,
            Transaction::Issue(tx) => tx.version,
            Transaction::Data(tx) => tx.version,
            Transaction::Exchange(tx) => tx.version,
            Transaction::InvokeScript(tx) => tx.version,
        }
    }

    /// Declared chain id byte.
    pub fn chain_id(&self) -> u8 {
        match self {
            Transaction::Transfer(tx) => tx.chain_id,
            Transaction::Issue(tx) => tx.chain_id,
            Transaction::Data(tx) => tx.chain_id,
            Transaction::Exchange(tx) => tx.chain_id,
            Transaction::InvokeScript(tx) => tx.chain_id,
        }
    }

    /// Sender public key.
    pub fn sender_public_key(&self) -> &PublicKey {
        match self {
            Transaction::Transfer(tx) => &tx.sender_public_key,
            Transaction::Issue(tx) => &tx.sender_public_key,
            Transaction::Data(tx) => &tx.sender_public_key,
            Transaction::Exchange(tx) => &tx.sender_public_key,
            Transaction::InvokeScript(tx) => &tx.sender_public_key,
        }
    }

    /// Sender address on the given network.
    pub fn sender_address(&self, scheme: Scheme) -> Address {
        Address::from_public_key(scheme, self.sender_public_key())
    }

    /// Declared fee.
    pub fn fee(&self) -> Amount {
        match self {
            Transaction::Transfer(tx) => tx.fee,
            Transaction::Issue(tx) => tx.fee,
            Transaction::Data(tx) => tx.fee,
            Transaction::Exchange(tx) => tx.fee,
            Transaction::InvokeScript(tx) => tx.fee,
        }
    }

    /// Sender-declared timestamp.
    pub fn timestamp(&self) -> WavesTime {
        match self {
            Transaction::Transfer(tx) => tx.timestamp,
            Transaction::Issue(tx) => tx.timestamp,
            Transaction::Data(tx) => tx.timestamp,
            Transaction::Exchange(tx) => tx.timestamp,
            Transaction::InvokeScript(tx) => tx.timestamp,
        }
    }

    /// Signature proofs.
    pub fn proofs(&self) -> &[Signature] {
        match self {
            Transaction::Transfer(tx) => &tx.proofs,
            Transaction::Issue(tx) => &tx.proofs,
            Transaction::Data(tx) => &tx.proofs,
            Transaction::Exchange(tx) => &tx.proofs,
            Transaction::InvokeScript(tx) => &tx.proofs,
        }
    }

    /// Mutable access to the proofs, used when signing.
    fn proofs_mut(&mut self) -> &mut Vec<Signature> {
        match self {
            Transaction::Transfer(tx) => &mut tx.proofs,
            Transaction::Issue(tx) => &mut tx.proofs,
            Transaction::Data(tx) => &mut tx.proofs,
            Transaction::Exchange(tx) => &mut tx.proofs,
            Transaction::InvokeScript(tx) => &mut tx.proofs,
        }
    }

    /// Data entries durably written when this transaction commits.
    pub fn written_data_entries(&self) -> &[DataEntry] {
        match self {
            Transaction::Data(tx) => &tx.entries,
            _ => &[],
        }
    }

    /// Canonical body bytes, proofs excluded. This is the signing and id
    /// pre-image.
    pub fn canonical_bytes(&self) -> Result<Vec<u8>, ModelsError> {
        let mut buffer = Vec::new();
        TransactionSerializer::new().serialize_body(self, &mut buffer)?;
        Ok(buffer)
    }

    /// Full serialized size in bytes, proofs included. Fee density divides
    /// the fee by this figure.
    pub fn serialized_size(&self) -> Result<u64, ModelsError> {
        let mut buffer = Vec::new();
        TransactionSerializer::new().serialize(self, &mut buffer)?;
        Ok(buffer.len() as u64)
    }

    /// Compute the transaction id.
    pub fn compute_id(&self) -> Result<TransactionId, ModelsError> {
        Ok(TransactionId(Hash::compute_from(&self.canonical_bytes()?)))
    }

    /// Sign the canonical body with the sender key, replacing the proofs.
    pub fn sign(&mut self, keypair: &waves_signature::KeyPair) -> Result<(), ModelsError> {
        let digest = Hash::compute_from(&self.canonical_bytes()?);
        let signature = keypair.sign(&digest)?;
        let proofs = self.proofs_mut();
        proofs.clear();
        proofs.push(signature);
        Ok(())
    }

    /// Verify the first proof against the sender public key and the
    /// canonical body.
    pub fn verify_signature(&self) -> Result<(), ModelsError> {
        let digest = Hash::compute_from(&self.canonical_bytes()?);
        let proof = self
            .proofs()
            .first()
            .ok_or_else(|| ModelsError::DeserializeError("missing proof".into()))?;
        self.sender_public_key()
            .verify_signature(&digest, proof)
            .map_err(ModelsError::from)
    }

    /// Decode a self-describing JSON payload into the concrete variant.
    ///
    /// The payload carries its own `type` and `version` tags; the variant is
    /// guessed from those before the full decode, the way the admin broadcast
    /// endpoint receives transactions.
    pub fn from_json(payload: &[u8]) -> Result<Transaction, ModelsError> {
        let tag: TransactionTypeVersion = serde_json::from_slice(payload)
            .map_err(|err| ModelsError::DeserializeError(err.to_string()))?;
        let tx_type = guess_transaction_type(&tag)?;
        let transaction = match tx_type {
            TransactionType::Transfer => Transaction::Transfer(
                serde_json::from_slice(payload)
                    .map_err(|err| ModelsError::DeserializeError(err.to_string()))?,
            ),
            TransactionType::Issue => Transaction::Issue(
                serde_json::from_slice(payload)
                    .map_err(|err| ModelsError::DeserializeError(err.to_string()))?,
            ),
            TransactionType::Data => Transaction::Data(
                serde_json::from_slice(payload)
                    .map_err(|err| ModelsError::DeserializeError(err.to_string()))?,
            ),
            TransactionType::Exchange => Transaction::Exchange(
                serde_json::from_slice(payload)
                    .map_err(|err| ModelsError::DeserializeError(err.to_string()))?,
            ),
            TransactionType::InvokeScript => Transaction::InvokeScript(
                serde_json::from_slice(payload)
                    .map_err(|err| ModelsError::DeserializeError(err.to_string()))?,
            ),
        };
        Ok(transaction)
    }

    /// Encode to a self-describing JSON value with the `type` tag injected.
    pub fn to_json(&self) -> Result<serde_json::Value, ModelsError> {
        let mut value = match self {
            Transaction::Transfer(tx) => serde_json::to_value(tx),
            Transaction::Issue(tx) => serde_json::to_value(tx),
            Transaction::Data(tx) => serde_json::to_value(tx),
            Transaction::Exchange(tx) => serde_json::to_value(tx),
            Transaction::InvokeScript(tx) => serde_json::to_value(tx),
        }
        .map_err(|err| ModelsError::SerializeError(err.to_string()))?;
        if let serde_json::Value::Object(map) = &mut value {
            map.insert(
                "type".to_string(),
                serde_json::json!(u8::from(self.tx_type())),
            );
        }
        Ok(value)
    }
}

fn serialize_length_prefixed_bytes(
    u32_serializer: &U32VarIntSerializer,
    bytes: &[u8],
    buffer: &mut Vec<u8>,
) -> Result<(), SerializeError> {
    u32_serializer.serialize(&(bytes.len() as u32), buffer)?;
    buffer.extend_from_slice(bytes);
    Ok(())
}

/// Serializer for `Transaction`
#[derive(Clone)]
pub struct TransactionSerializer {
    u32_serializer: U32VarIntSerializer,
    amount_serializer: AmountSerializer,
    time_serializer: WavesTimeSerializer,
    address_serializer: AddressSerializer,
    data_entry_serializer: DataEntrySerializer,
    signature_serializer: SignatureSerializer,
}

impl TransactionSerializer {
    /// Creates a new serializer for `Transaction`
    pub fn new() -> Self {
        Self {
            u32_serializer: U32VarIntSerializer::new(),
            amount_serializer: AmountSerializer::new(),
            time_serializer: WavesTimeSerializer::new(),
            address_serializer: AddressSerializer::new(),
            data_entry_serializer: DataEntrySerializer::new(),
            signature_serializer: SignatureSerializer::new(),
        }
    }

    fn serialize_order(&self, order: &Order, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(order.sender_public_key.to_bytes());
        buffer.push(match order.side {
            OrderSide::Buy => 0,
            OrderSide::Sell => 1,
        });
        buffer.extend_from_slice(&order.amount.to_be_bytes());
        buffer.extend_from_slice(&order.price.to_be_bytes());
        self.time_serializer.serialize(&order.timestamp, buffer)?;
        self.time_serializer.serialize(&order.expiration, buffer)?;
        self.signature_serializer
            .serialize(&order.signature, buffer)?;
        Ok(())
    }

    /// Serialize the canonical body (type, version, chain id, fields), proofs
    /// excluded.
    pub fn serialize_body(
        &self,
        value: &Transaction,
        buffer: &mut Vec<u8>,
    ) -> Result<(), SerializeError> {
        buffer.push(u8::from(value.tx_type()));
        buffer.push(value.version());
        buffer.push(value.chain_id());
        buffer.extend(value.sender_public_key().to_bytes());
        self.time_serializer.serialize(&value.timestamp(), buffer)?;
        self.amount_serializer.serialize(&value.fee(), buffer)?;
        match value {
            Transaction::Transfer(tx) => {
                self.address_serializer.serialize(&tx.recipient, buffer)?;
                self.amount_serializer.serialize(&tx.amount, buffer)?;
                serialize_length_prefixed_bytes(&self.u32_serializer, &tx.attachment, buffer)?;
            }
            Transaction::Issue(tx) => {
                serialize_length_prefixed_bytes(&self.u32_serializer, tx.name.as_bytes(), buffer)?;
                serialize_length_prefixed_bytes(
                    &self.u32_serializer,
                    tx.description.as_bytes(),
                    buffer,
                )?;
                buffer.extend_from_slice(&tx.quantity.to_be_bytes());
                buffer.push(tx.decimals);
                buffer.push(u8::from(tx.reissuable));
            }
            Transaction::Data(tx) => {
                self.u32_serializer
                    .serialize(&(tx.entries.len() as u32), buffer)?;
                for entry in &tx.entries {
                    self.data_entry_serializer.serialize(entry, buffer)?;
                }
            }
            Transaction::Exchange(tx) => {
                self.serialize_order(&tx.buy_order, buffer)?;
                self.serialize_order(&tx.sell_order, buffer)?;
                buffer.extend_from_slice(&tx.amount.to_be_bytes());
                buffer.extend_from_slice(&tx.price.to_be_bytes());
            }
            Transaction::InvokeScript(tx) => {
                self.address_serializer.serialize(&tx.dapp, buffer)?;
                serialize_length_prefixed_bytes(
                    &self.u32_serializer,
                    tx.function.as_bytes(),
                    buffer,
                )?;
                self.u32_serializer
                    .serialize(&(tx.args.len() as u32), buffer)?;
                for arg in &tx.args {
                    self.data_entry_serializer.serialize(
                        &DataEntry {
                            key: String::new(),
                            value: arg.clone(),
                        },
                        buffer,
                    )?;
                }
                self.amount_serializer.serialize(&tx.payment, buffer)?;
            }
        }
        Ok(())
    }
}

impl Default for TransactionSerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<Transaction> for TransactionSerializer {
    fn serialize(&self, value: &Transaction, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.serialize_body(value, buffer)?;
        self.u32_serializer
            .serialize(&(value.proofs().len() as u32), buffer)?;
        for proof in value.proofs() {
            self.signature_serializer.serialize(proof, buffer)?;
        }
        Ok(())
    }
}

/// Deserializer for `Transaction`
#[derive(Clone)]
pub struct TransactionDeserializer {
    length_deserializer: U32VarIntDeserializer,
    proofs_length_deserializer: U32VarIntDeserializer,
    entries_length_deserializer: U32VarIntDeserializer,
    args_length_deserializer: U32VarIntDeserializer,
    amount_deserializer: AmountDeserializer,
    time_deserializer: WavesTimeDeserializer,
    address_deserializer: AddressDeserializer,
    data_entry_deserializer: DataEntryDeserializer,
    public_key_deserializer: PublicKeyDeserializer,
    signature_deserializer: SignatureDeserializer,
}

impl TransactionDeserializer {
    /// Creates a new deserializer for `Transaction`
    pub fn new() -> Self {
        Self {
            length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_TRANSACTION_SIZE_BYTES as u32),
            ),
            proofs_length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_PROOFS as u32),
            ),
            entries_length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_DATA_ENTRIES_PER_TRANSACTION as u32),
            ),
            args_length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_INVOKE_ARGS as u32),
            ),
            amount_deserializer: AmountDeserializer::new(),
            time_deserializer: WavesTimeDeserializer::new((
                Included(WavesTime::ZERO),
                Included(WavesTime::from_millis(u64::MAX)),
            )),
            address_deserializer: AddressDeserializer::new(),
            data_entry_deserializer: DataEntryDeserializer::new(),
            public_key_deserializer: PublicKeyDeserializer::new(),
            signature_deserializer: SignatureDeserializer::new(),
        }
    }

    fn deserialize_bytes<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        input: &'a [u8],
    ) -> IResult<&'a [u8], Vec<u8>, E> {
        let (rest, length) = self.length_deserializer.deserialize(input)?;
        if rest.len() < length as usize {
            return Err(nom::Err::Error(ParseError::from_error_kind(
                input,
                nom::error::ErrorKind::LengthValue,
            )));
        }
        Ok((&rest[length as usize..], rest[..length as usize].to_vec()))
    }

    fn deserialize_string<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        input: &'a [u8],
    ) -> IResult<&'a [u8], String, E> {
        let (rest, bytes) = self.deserialize_bytes(input)?;
        let text = String::from_utf8(bytes).map_err(|_| {
            nom::Err::Error(ParseError::from_error_kind(
                input,
                nom::error::ErrorKind::Fail,
            ))
        })?;
        Ok((rest, text))
    }

    fn deserialize_order<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        input: &'a [u8],
    ) -> IResult<&'a [u8], Order, E> {
        let (rest, sender_public_key) = self.public_key_deserializer.deserialize(input)?;
        let (rest, side_byte) = nom::number::complete::be_u8(rest)?;
        let side = match side_byte {
            0 => OrderSide::Buy,
            1 => OrderSide::Sell,
            _ => {
                return Err(nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::Fail,
                )))
            }
        };
        let (rest, amount) = nom::number::complete::be_u64(rest)?;
        let (rest, price) = nom::number::complete::be_u64(rest)?;
        let (rest, timestamp) = self.time_deserializer.deserialize(rest)?;
        let (rest, expiration) = self.time_deserializer.deserialize(rest)?;
        let (rest, signature) = self.signature_deserializer.deserialize(rest)?;
        Ok((
            rest,
            Order {
                sender_public_key,
                side,
                amount,
                price,
                timestamp,
                expiration,
                signature,
            },
        ))
    }
}

impl Default for TransactionDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Deserializer<Transaction> for TransactionDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Transaction, E> {
        context("Failed transaction deserialization", |input: &'a [u8]| {
            let (rest, type_byte) = nom::number::complete::be_u8(input)?;
            let (rest, version) = nom::number::complete::be_u8(rest)?;
            let (rest, chain_id) = nom::number::complete::be_u8(rest)?;
            let tx_type = TransactionType::try_from(type_byte).map_err(|_| {
                nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::Fail,
                ))
            })?;
            let (rest, sender_public_key) = self.public_key_deserializer.deserialize(rest)?;
            let (rest, timestamp) = self.time_deserializer.deserialize(rest)?;
            let (rest, fee) = self.amount_deserializer.deserialize(rest)?;
            let (rest, mut transaction) = match tx_type {
                TransactionType::Transfer => {
                    let (rest, recipient) = self.address_deserializer.deserialize(rest)?;
                    let (rest, amount) = self.amount_deserializer.deserialize(rest)?;
                    let (rest, attachment) = self.deserialize_bytes(rest)?;
                    (
                        rest,
                        Transaction::Transfer(TransferTransaction {
                            version,
                            chain_id,
                            sender_public_key,
                            recipient,
                            amount,
                            fee,
                            timestamp,
                            attachment,
                            proofs: Vec::new(),
                        }),
                    )
                }
                TransactionType::Issue => {
                    let (rest, name) = self.deserialize_string(rest)?;
                    let (rest, description) = self.deserialize_string(rest)?;
                    let (rest, quantity) = nom::number::complete::be_u64(rest)?;
                    let (rest, decimals) = nom::number::complete::be_u8(rest)?;
                    let (rest, reissuable_byte) = nom::number::complete::be_u8(rest)?;
                    (
                        rest,
                        Transaction::Issue(IssueTransaction {
                            version,
                            chain_id,
                            sender_public_key,
                            name,
                            description,
                            quantity,
                            decimals,
                            reissuable: reissuable_byte != 0,
                            fee,
                            timestamp,
                            proofs: Vec::new(),
                        }),
                    )
                }
                TransactionType::Data => {
                    let (rest, entry_count) = self.entries_length_deserializer.deserialize(rest)?;
                    let (rest, entries) = count(
                        |input| self.data_entry_deserializer.deserialize(input),
                        entry_count as usize,
                    )(rest)?;
                    (
                        rest,
                        Transaction::Data(DataTransaction {
                            version,
                            chain_id,
                            sender_public_key,
                            entries,
                            fee,
                            timestamp,
                            proofs: Vec::new(),
                        }),
                    )
                }
                TransactionType::Exchange => {
                    let (rest, buy_order) = self.deserialize_order(rest)?;
                    let (rest, sell_order) = self.deserialize_order(rest)?;
                    let (rest, amount) = nom::number::complete::be_u64(rest)?;
                    let (rest, price) = nom::number::complete::be_u64(rest)?;
                    (
                        rest,
                        Transaction::Exchange(ExchangeTransaction {
                            version,
                            chain_id,
                            sender_public_key,
                            buy_order,
                            sell_order,
                            amount,
                            price,
                            fee,
                            timestamp,
                            proofs: Vec::new(),
                        }),
                    )
                }
                TransactionType::InvokeScript => {
                    let (rest, dapp) = self.address_deserializer.deserialize(rest)?;
                    let (rest, function) = self.deserialize_string(rest)?;
                    let (rest, arg_count) = self.args_length_deserializer.deserialize(rest)?;
                    let (rest, arg_entries) = count(
                        |input| self.data_entry_deserializer.deserialize(input),
                        arg_count as usize,
                    )(rest)?;
                    let (rest, payment) = self.amount_deserializer.deserialize(rest)?;
                    (
                        rest,
                        Transaction::InvokeScript(InvokeScriptTransaction {
                            version,
                            chain_id,
                            sender_public_key,
                            dapp,
                            function,
                            args: arg_entries.into_iter().map(|entry| entry.value).collect(),
                            payment,
                            fee,
                            timestamp,
                            proofs: Vec::new(),
                        }),
                    )
                }
            };
            let (rest, proof_count) = self.proofs_length_deserializer.deserialize(rest)?;
            let (rest, proofs) = count(
                |input| self.signature_deserializer.deserialize(input),
                proof_count as usize,
            )(rest)?;
            *transaction.proofs_mut() = proofs;
            Ok((rest, transaction))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waves_serialization::DeserializeError;
    use waves_signature::KeyPair;

    fn transfer_fixture(keypair: &KeyPair) -> Transaction {
        let recipient =
            Address::from_public_key(Scheme::MAINNET, &KeyPair::generate().get_public_key());
        let mut transaction = Transaction::Transfer(TransferTransaction {
            version: 3,
            chain_id: Scheme::MAINNET.to_byte(),
            sender_public_key: keypair.get_public_key(),
            recipient,
            amount: Amount::from_raw(100_000_000),
            fee: Amount::from_raw(100_000),
            timestamp: WavesTime::from_millis(1_700_000_000_000),
            attachment: b"memo".to_vec(),
            proofs: Vec::new(),
        });
        transaction.sign(keypair).unwrap();
        transaction
    }

    #[test]
    fn id_is_stable_under_proofs() {
        let keypair = KeyPair::generate();
        let mut transaction = transfer_fixture(&keypair);
        let id_signed = transaction.compute_id().unwrap();
        transaction.proofs_mut().clear();
        assert_eq!(id_signed, transaction.compute_id().unwrap());
    }

    #[test]
    fn signature_verifies() {
        let keypair = KeyPair::generate();
        let transaction = transfer_fixture(&keypair);
        transaction.verify_signature().unwrap();
    }

    #[test]
    fn tampered_body_fails_verification() {
        let keypair = KeyPair::generate();
        let mut transaction = transfer_fixture(&keypair);
        if let Transaction::Transfer(tx) = &mut transaction {
            tx.amount = Amount::from_raw(999);
        }
        assert!(transaction.verify_signature().is_err());
    }

    #[test]
    fn binary_round_trip() {
        let keypair = KeyPair::generate();
        let transaction = transfer_fixture(&keypair);
        let mut buffer = Vec::new();
        TransactionSerializer::new()
            .serialize(&transaction, &mut buffer)
            .unwrap();
        let (rest, got) = TransactionDeserializer::new()
            .deserialize::<DeserializeError>(&buffer)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(transaction, got);
    }

    #[test]
    fn json_guessing_dispatches_on_type_tag() {
        let keypair = KeyPair::generate();
        let transaction = transfer_fixture(&keypair);
        let json = serde_json::to_vec(&transaction.to_json().unwrap()).unwrap();
        let decoded = Transaction::from_json(&json).unwrap();
        assert_eq!(transaction, decoded);
    }

    #[test]
    fn unknown_type_tag_is_rejected() {
        let payload = br#"{"type": 99, "version": 1}"#;
        assert!(matches!(
            Transaction::from_json(payload),
            Err(ModelsError::UnknownTransactionType(99, 1))
        ));
    }

    #[test]
    fn data_transaction_round_trip() {
        let keypair = KeyPair::generate();
        let mut transaction = Transaction::Data(DataTransaction {
            version: 2,
            chain_id: Scheme::TESTNET.to_byte(),
            sender_public_key: keypair.get_public_key(),
            entries: vec![
                DataEntry {
                    key: "bridge_height".into(),
                    value: DataValue::Integer(12),
                },
                DataEntry {
                    key: "bridge_hash".into(),
                    value: DataValue::Binary(vec![7; 32]),
                },
            ],
            fee: Amount::from_raw(500_000),
            timestamp: WavesTime::from_millis(1_700_000_000_000),
            proofs: Vec::new(),
        });
        transaction.sign(&keypair).unwrap();
        let mut buffer = Vec::new();
        TransactionSerializer::new()
            .serialize(&transaction, &mut buffer)
            .unwrap();
        let (rest, got) = TransactionDeserializer::new()
            .deserialize::<DeserializeError>(&buffer)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(transaction, got);
    }
}
