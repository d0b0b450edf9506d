// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::ModelsError;
use crate::scheme::Scheme;
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::str::FromStr;
use waves_hash::{Hash, HashDeserializer, HashSerializer};
use waves_serialization::{Deserializer, SerializeError, Serializer};
use waves_signature::PublicKey;

/// Size in bytes of a serialized address.
pub const ADDRESS_SIZE_BYTES: usize = waves_hash::HASH_SIZE_BYTES;

/// An account address, derived from a public key and the chain id byte.
#[derive(
    Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, SerializeDisplay, DeserializeFromStr,
)]
pub struct Address(pub Hash);

const ADDRESS_PREFIX: char = 'A';

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}{}", ADDRESS_PREFIX, self.0.to_bs58_check())
    }
}

impl std::fmt::Debug for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Address {
    type Err = ModelsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == ADDRESS_PREFIX => {
                let data = chars.collect::<String>();
                Ok(Address(
                    Hash::from_bs58_check(&data).map_err(|_| ModelsError::AddressParseError)?,
                ))
            }
            _ => Err(ModelsError::AddressParseError),
        }
    }
}

impl Address {
    /// Derive the address of a public key on a given network.
    ///
    /// The chain id byte enters the digest so that the same key maps to
    /// different addresses on different networks.
    pub fn from_public_key(scheme: Scheme, public_key: &PublicKey) -> Self {
        Address(Hash::compute_from_tuple(&[
            &[scheme.to_byte()],
            public_key.to_bytes(),
        ]))
    }

    /// address to bytes
    pub fn to_bytes(&self) -> &[u8; ADDRESS_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// address from bytes
    pub fn from_bytes(data: &[u8; ADDRESS_SIZE_BYTES]) -> Address {
        Address(Hash::from_bytes(data))
    }
}

/// Serializer for `Address`
#[derive(Default, Clone)]
pub struct AddressSerializer {
    hash_serializer: HashSerializer,
}

impl AddressSerializer {
    /// Creates a new serializer for `Address`
    pub const fn new() -> Self {
        Self {
            hash_serializer: HashSerializer::new(),
        }
    }
}

impl Serializer<Address> for AddressSerializer {
    fn serialize(&self, value: &Address, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        self.hash_serializer.serialize(&value.0, buffer)
    }
}

/// Deserializer for `Address`
#[derive(Default, Clone)]
pub struct AddressDeserializer {
    hash_deserializer: HashDeserializer,
}

impl AddressDeserializer {
    /// Creates a new deserializer for `Address`
    pub const fn new() -> Self {
        Self {
            hash_deserializer: HashDeserializer::new(),
        }
    }
}

impl Deserializer<Address> for AddressDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Address, E> {
        context("Failed address deserialization", |input| {
            let (rest, hash) = self.hash_deserializer.deserialize(input)?;
            Ok((rest, Address(hash)))
        })(buffer)
    }
}
