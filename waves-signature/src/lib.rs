// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Ed25519 key and signature management.
//!
//! Generator keys sign block headers and transactions over their canonical
//! byte forms; the same deterministic signatures double as VRF proofs in the
//! proof-of-stake path.

#![warn(missing_docs)]

mod error;

pub use error::WavesSignatureError;

use ed25519_dalek::{Signer, Verifier};
use nom::error::{context, ContextError, ParseError};
use nom::IResult;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::convert::TryInto;
use std::str::FromStr;
use waves_hash::Hash;
use waves_serialization::{Deserializer, SerializeError, Serializer};

/// Size of a serialized secret key, in bytes.
pub const SECRET_KEY_SIZE_BYTES: usize = 32;
/// Size of a serialized public key, in bytes.
pub const PUBLIC_KEY_SIZE_BYTES: usize = 32;
/// Size of a serialized signature, in bytes.
pub const SIGNATURE_SIZE_BYTES: usize = 64;

const SECRET_KEY_PREFIX: char = 'S';
const PUBLIC_KEY_PREFIX: char = 'P';

/// An Ed25519 keypair.
#[derive(Clone)]
pub struct KeyPair(ed25519_dalek::SigningKey);

impl std::fmt::Display for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            SECRET_KEY_PREFIX,
            bs58::encode(self.0.to_bytes()).with_check().into_string()
        )
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for KeyPair {
    type Err = WavesSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == SECRET_KEY_PREFIX => {
                let data = chars.collect::<String>();
                let decoded = bs58::decode(data)
                    .with_check(None)
                    .into_vec()
                    .map_err(|err| WavesSignatureError::ParsingError(err.to_string()))?;
                let bytes: [u8; SECRET_KEY_SIZE_BYTES] = decoded
                    .as_slice()
                    .try_into()
                    .map_err(|_| WavesSignatureError::ParsingError("bad key length".into()))?;
                Ok(KeyPair(ed25519_dalek::SigningKey::from_bytes(&bytes)))
            }
            _ => Err(WavesSignatureError::WrongPrefix(
                SECRET_KEY_PREFIX.to_string(),
                s.chars().next().map(|c| c.to_string()).unwrap_or_default(),
            )),
        }
    }
}

impl KeyPair {
    /// Generate a fresh random keypair.
    pub fn generate() -> Self {
        KeyPair(ed25519_dalek::SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Sign a pre-hashed digest. Ed25519 signing is deterministic, which the
    /// VRF construction depends on.
    pub fn sign(&self, hash: &Hash) -> Result<Signature, WavesSignatureError> {
        Ok(Signature(self.0.sign(hash.to_bytes())))
    }

    /// Sign raw bytes.
    pub fn sign_bytes(&self, data: &[u8]) -> Result<Signature, WavesSignatureError> {
        Ok(Signature(self.0.sign(data)))
    }

    /// The public half of the pair.
    pub fn get_public_key(&self) -> PublicKey {
        PublicKey(self.0.verifying_key())
    }

    /// Raw secret bytes.
    pub fn to_bytes(&self) -> [u8; SECRET_KEY_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// Rebuild a keypair from raw secret bytes.
    pub fn from_bytes(data: &[u8; SECRET_KEY_SIZE_BYTES]) -> Self {
        KeyPair(ed25519_dalek::SigningKey::from_bytes(data))
    }
}

/// An Ed25519 public key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, SerializeDisplay, DeserializeFromStr)]
pub struct PublicKey(ed25519_dalek::VerifyingKey);

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.as_bytes().cmp(other.0.as_bytes())
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}{}",
            PUBLIC_KEY_PREFIX,
            bs58::encode(self.0.as_bytes()).with_check().into_string()
        )
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for PublicKey {
    type Err = WavesSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match chars.next() {
            Some(prefix) if prefix == PUBLIC_KEY_PREFIX => {
                let data = chars.collect::<String>();
                let decoded = bs58::decode(data)
                    .with_check(None)
                    .into_vec()
                    .map_err(|err| WavesSignatureError::ParsingError(err.to_string()))?;
                PublicKey::from_bytes(
                    decoded
                        .as_slice()
                        .try_into()
                        .map_err(|_| WavesSignatureError::ParsingError("bad key length".into()))?,
                )
            }
            _ => Err(WavesSignatureError::WrongPrefix(
                PUBLIC_KEY_PREFIX.to_string(),
                s.chars().next().map(|c| c.to_string()).unwrap_or_default(),
            )),
        }
    }
}

impl PublicKey {
    /// Verify a signature over a pre-hashed digest.
    pub fn verify_signature(
        &self,
        hash: &Hash,
        signature: &Signature,
    ) -> Result<(), WavesSignatureError> {
        self.0
            .verify(hash.to_bytes(), &signature.0)
            .map_err(|err| WavesSignatureError::SignatureError(err.to_string()))
    }

    /// Verify a signature over raw bytes.
    pub fn verify_bytes(
        &self,
        data: &[u8],
        signature: &Signature,
    ) -> Result<(), WavesSignatureError> {
        self.0
            .verify(data, &signature.0)
            .map_err(|err| WavesSignatureError::SignatureError(err.to_string()))
    }

    /// Raw key bytes.
    pub fn to_bytes(&self) -> &[u8; PUBLIC_KEY_SIZE_BYTES] {
        self.0.as_bytes()
    }

    /// Rebuild a public key from raw bytes.
    pub fn from_bytes(
        data: &[u8; PUBLIC_KEY_SIZE_BYTES],
    ) -> Result<PublicKey, WavesSignatureError> {
        ed25519_dalek::VerifyingKey::from_bytes(data)
            .map(PublicKey)
            .map_err(|err| WavesSignatureError::ParsingError(err.to_string()))
    }
}

/// Deserializer for `PublicKey`
#[derive(Default, Clone)]
pub struct PublicKeyDeserializer;

impl PublicKeyDeserializer {
    /// Creates a deserializer for `PublicKey`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<PublicKey> for PublicKeyDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], PublicKey, E> {
        context("Failed public key deserialization", |input: &'a [u8]| {
            if buffer.len() < PUBLIC_KEY_SIZE_BYTES {
                return Err(nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::LengthValue,
                )));
            }
            let key = PublicKey::from_bytes(
                buffer[..PUBLIC_KEY_SIZE_BYTES].try_into().map_err(|_| {
                    nom::Err::Error(ParseError::from_error_kind(
                        input,
                        nom::error::ErrorKind::Fail,
                    ))
                })?,
            )
            .map_err(|_| {
                nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::Fail,
                ))
            })?;
            Ok((&buffer[PUBLIC_KEY_SIZE_BYTES..], key))
        })(buffer)
    }
}

/// An Ed25519 signature.
#[derive(Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct Signature(ed25519_dalek::Signature);

impl std::fmt::Display for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            bs58::encode(self.0.to_bytes()).with_check().into_string()
        )
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl FromStr for Signature {
    type Err = WavesSignatureError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decoded = bs58::decode(s)
            .with_check(None)
            .into_vec()
            .map_err(|err| WavesSignatureError::ParsingError(err.to_string()))?;
        let bytes: [u8; SIGNATURE_SIZE_BYTES] = decoded
            .as_slice()
            .try_into()
            .map_err(|_| WavesSignatureError::ParsingError("bad signature length".into()))?;
        Ok(Signature(ed25519_dalek::Signature::from_bytes(&bytes)))
    }
}

impl Signature {
    /// Raw signature bytes.
    pub fn to_bytes(&self) -> [u8; SIGNATURE_SIZE_BYTES] {
        self.0.to_bytes()
    }

    /// Rebuild a signature from raw bytes.
    pub fn from_bytes(data: &[u8; SIGNATURE_SIZE_BYTES]) -> Signature {
        Signature(ed25519_dalek::Signature::from_bytes(data))
    }
}

/// Serializer for `Signature`
#[derive(Default, Clone)]
pub struct SignatureSerializer;

impl SignatureSerializer {
    /// Creates a serializer for `Signature`
    pub const fn new() -> Self {
        Self
    }
}

impl Serializer<Signature> for SignatureSerializer {
    fn serialize(&self, value: &Signature, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        buffer.extend(value.to_bytes());
        Ok(())
    }
}

/// Deserializer for `Signature`
#[derive(Default, Clone)]
pub struct SignatureDeserializer;

impl SignatureDeserializer {
    /// Creates a deserializer for `Signature`
    pub const fn new() -> Self {
        Self
    }
}

impl Deserializer<Signature> for SignatureDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], Signature, E> {
        context("Failed signature deserialization", |input: &'a [u8]| {
            if buffer.len() < SIGNATURE_SIZE_BYTES {
                return Err(nom::Err::Error(ParseError::from_error_kind(
                    input,
                    nom::error::ErrorKind::LengthValue,
                )));
            }
            let signature = Signature::from_bytes(
                buffer[..SIGNATURE_SIZE_BYTES].try_into().map_err(|_| {
                    nom::Err::Error(ParseError::from_error_kind(
                        input,
                        nom::error::ErrorKind::Fail,
                    ))
                })?,
            );
            Ok((&buffer[SIGNATURE_SIZE_BYTES..], signature))
        })(buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_and_verify() {
        let keypair = KeyPair::generate();
        let hash = Hash::compute_from(b"payload");
        let signature = keypair.sign(&hash).unwrap();
        keypair
            .get_public_key()
            .verify_signature(&hash, &signature)
            .unwrap();
    }

    #[test]
    fn verify_rejects_other_key() {
        let keypair = KeyPair::generate();
        let other = KeyPair::generate();
        let hash = Hash::compute_from(b"payload");
        let signature = keypair.sign(&hash).unwrap();
        assert!(other
            .get_public_key()
            .verify_signature(&hash, &signature)
            .is_err());
    }

    #[test]
    fn deterministic_signatures() {
        // the VRF path requires that signing the same digest twice yields
        // identical proofs
        let keypair = KeyPair::generate();
        let hash = Hash::compute_from(b"gen-sig");
        assert_eq!(
            keypair.sign(&hash).unwrap().to_bytes(),
            keypair.sign(&hash).unwrap().to_bytes()
        );
    }

    #[test]
    fn string_round_trips() {
        let keypair = KeyPair::generate();
        let restored = KeyPair::from_str(&keypair.to_string()).unwrap();
        assert_eq!(keypair.to_bytes(), restored.to_bytes());

        let public = keypair.get_public_key();
        assert_eq!(public, PublicKey::from_str(&public.to_string()).unwrap());

        let signature = keypair.sign(&Hash::compute_from(b"x")).unwrap();
        assert_eq!(
            signature,
            Signature::from_str(&signature.to_string()).unwrap()
        );
    }
}
