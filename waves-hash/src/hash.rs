// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::WavesHashError;
use crate::settings::HASH_SIZE_BYTES;
use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use nom::{
    error::{context, ContextError, ParseError},
    IResult,
};
use std::{cmp::Ordering, convert::TryInto, str::FromStr};
use waves_serialization::{Deserializer, SerializeError, Serializer};

type Blake2b256 = Blake2b<U32>;

/// Hash wrapper, the underlying hash type is Blake2b-256.
///
/// Waves identifiers (block ids, transaction ids, addresses, generation
/// signatures) are all Blake2b-256 digests of a canonical byte form.
#[derive(Eq, PartialEq, Copy, Clone, Hash)]
pub struct Hash([u8; HASH_SIZE_BYTES]);

impl PartialOrd for Hash {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Ordering is on the raw digest bytes. Fork choice relies on this to break
/// score ties deterministically on the smallest block id.
impl Ord for Hash {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl std::fmt::Display for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl std::fmt::Debug for Hash {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_bs58_check())
    }
}

impl Hash {
    /// Compute a digest from data.
    ///
    /// # Example
    ///  ```
    /// # use waves_hash::Hash;
    /// let hash = Hash::compute_from(&"hello world".as_bytes());
    /// ```
    pub fn compute_from(data: &[u8]) -> Self {
        let digest = Blake2b256::digest(data);
        Hash(digest.into())
    }

    /// Compute a digest from the concatenation of two byte slices, without an
    /// intermediate allocation. Used for generation signature chaining.
    pub fn compute_from_tuple(parts: &[&[u8]]) -> Self {
        let mut hasher = Blake2b256::new();
        for part in parts {
            hasher.update(part);
        }
        Hash(hasher.finalize().into())
    }

    /// Serialize a Hash using `bs58` encoding with checksum.
    pub fn to_bs58_check(&self) -> String {
        bs58::encode(self.to_bytes()).with_check().into_string()
    }

    /// Serialize a Hash as bytes.
    pub fn to_bytes(&self) -> &[u8; HASH_SIZE_BYTES] {
        &self.0
    }

    /// Convert into bytes.
    pub fn into_bytes(self) -> [u8; HASH_SIZE_BYTES] {
        self.0
    }

    /// Deserialize using `bs58` encoding with checksum.
    pub fn from_bs58_check(data: &str) -> Result<Hash, WavesHashError> {
        let decoded_bs58_check = bs58::decode(data)
            .with_check(None)
            .into_vec()
            .map_err(|err| WavesHashError::ParsingError(format!("{}", err)))?;
        Ok(Hash::from_bytes(
            &decoded_bs58_check
                .as_slice()
                .try_into()
                .map_err(|err| WavesHashError::ParsingError(format!("{}", err)))?,
        ))
    }

    /// Deserialize a Hash from raw bytes.
    pub fn from_bytes(data: &[u8; HASH_SIZE_BYTES]) -> Hash {
        Hash(*data)
    }
}

impl FromStr for Hash {
    type Err = WavesHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Hash::from_bs58_check(s)
    }
}

impl ::serde::Serialize for Hash {
    /// Human readable serialization: bs58-check string; binary: raw bytes.
    fn serialize<S: ::serde::Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        if s.is_human_readable() {
            s.collect_str(&self.to_bs58_check())
        } else {
            s.serialize_bytes(self.to_bytes())
        }
    }
}

impl<'de> ::serde::Deserialize<'de> for Hash {
    fn deserialize<D: ::serde::Deserializer<'de>>(d: D) -> Result<Hash, D::Error> {
        if d.is_human_readable() {
            struct Base58CheckVisitor;

            impl<'de> ::serde::de::Visitor<'de> for Base58CheckVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("an ASCII base58check string")
                }

                fn visit_bytes<E: ::serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                    if let Ok(v_str) = std::str::from_utf8(v) {
                        Hash::from_bs58_check(v_str).map_err(E::custom)
                    } else {
                        Err(E::invalid_value(::serde::de::Unexpected::Bytes(v), &self))
                    }
                }

                fn visit_str<E: ::serde::de::Error>(self, v: &str) -> Result<Self::Value, E> {
                    Hash::from_bs58_check(v).map_err(E::custom)
                }
            }
            d.deserialize_str(Base58CheckVisitor)
        } else {
            struct BytesVisitor;

            impl<'de> ::serde::de::Visitor<'de> for BytesVisitor {
                type Value = Hash;

                fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                    formatter.write_str("a bytestring")
                }

                fn visit_bytes<E: ::serde::de::Error>(self, v: &[u8]) -> Result<Self::Value, E> {
                    Ok(Hash::from_bytes(v.try_into().map_err(E::custom)?))
                }
            }
            d.deserialize_bytes(BytesVisitor)
        }
    }
}

/// Serializer for `Hash`
#[derive(Default, Clone)]
pub struct HashSerializer;

impl HashSerializer {
    /// Creates a serializer for `Hash`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<Hash> for HashSerializer {
    fn serialize(&self, value: &Hash, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `Hash`
#[derive(Default, Clone)]
pub struct HashDeserializer;

impl HashDeserializer {
    /// Creates a deserializer for `Hash`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<Hash> for HashDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Hash, E> {
        context("Failed hash deserialization", |input: &'a [u8]| {
            if buffer.len() < HASH_SIZE_BYTES {
                return Err(nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::LengthValue,
                )));
            }
            Ok((
                &buffer[HASH_SIZE_BYTES..],
                Hash::from_bytes(
                    buffer[..HASH_SIZE_BYTES]
                        .try_into()
                        .map_err(|_| {
                            nom::Err::Error(ParseError::from_error_kind(
                                input,
                                nom::error::ErrorKind::Fail,
                            ))
                        })?,
                ),
            ))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waves_serialization::DeserializeError;

    #[test]
    fn bs58_round_trip() {
        let hash = Hash::compute_from(b"test");
        let serialized = hash.to_bs58_check();
        assert_eq!(hash, Hash::from_bs58_check(&serialized).unwrap());
    }

    #[test]
    fn binary_round_trip() {
        let hash = Hash::compute_from(b"test");
        let mut buffer = Vec::new();
        HashSerializer::new().serialize(&hash, &mut buffer).unwrap();
        let (rest, got) = HashDeserializer::new()
            .deserialize::<DeserializeError>(&buffer)
            .unwrap();
        assert!(rest.is_empty());
        assert_eq!(hash, got);
    }

    #[test]
    fn tuple_digest_matches_concatenation() {
        let a = b"generation".as_slice();
        let b = b"signature".as_slice();
        let mut concat = a.to_vec();
        concat.extend_from_slice(b);
        assert_eq!(
            Hash::compute_from_tuple(&[a, b]),
            Hash::compute_from(&concat)
        );
    }
}
