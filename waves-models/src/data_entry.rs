// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use crate::error::ModelsError;
use nom::error::{context, ContextError, ParseError};
use nom::multi::count;
use nom::IResult;
use serde::{Deserialize, Serialize};
use std::ops::Bound::Included;
use waves_serialization::{
    Deserializer, SerializeError, Serializer, U32VarIntDeserializer, U32VarIntSerializer,
};

/// Maximum UTF-8 byte length of a data entry key.
pub const MAX_DATA_KEY_BYTES: usize = 100;
/// Maximum byte length of a binary or string data entry value.
pub const MAX_DATA_VALUE_BYTES: usize = 32 * 1024;

/// Typed value of an account data entry.
///
/// `Delete` is a tombstone: applying it removes the key from the account
/// store, and it is forwarded to L2 subscribers like any other write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum DataValue {
    /// 64-bit signed integer
    Integer(i64),
    /// boolean flag
    Boolean(bool),
    /// raw bytes, at most [`MAX_DATA_VALUE_BYTES`]
    Binary(#[serde(with = "serde_bytes_bs58")] Vec<u8>),
    /// UTF-8 string, at most [`MAX_DATA_VALUE_BYTES`] bytes
    String(String),
    /// tombstone removing the key
    Delete,
}

pub(crate) mod serde_bytes_bs58 {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&bs58::encode(bytes).into_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(d)?;
        bs58::decode(text)
            .into_vec()
            .map_err(serde::de::Error::custom)
    }
}

/// A keyed, typed account data entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEntry {
    /// UTF-8 key, at most [`MAX_DATA_KEY_BYTES`] bytes
    pub key: String,
    /// typed value
    #[serde(flatten)]
    pub value: DataValue,
}

impl DataEntry {
    /// Enforce the protocol size limits on key and value.
    pub fn check_limits(&self) -> Result<(), ModelsError> {
        if self.key.as_bytes().len() > MAX_DATA_KEY_BYTES {
            return Err(ModelsError::DataEntryTooLarge(format!(
                "key is {} bytes, max {}",
                self.key.as_bytes().len(),
                MAX_DATA_KEY_BYTES
            )));
        }
        let value_len = match &self.value {
            DataValue::Binary(bytes) => bytes.len(),
            DataValue::String(text) => text.as_bytes().len(),
            _ => 0,
        };
        if value_len > MAX_DATA_VALUE_BYTES {
            return Err(ModelsError::DataEntryTooLarge(format!(
                "value is {} bytes, max {}",
                value_len, MAX_DATA_VALUE_BYTES
            )));
        }
        Ok(())
    }
}

const TAG_INTEGER: u8 = 0;
const TAG_BOOLEAN: u8 = 1;
const TAG_BINARY: u8 = 2;
const TAG_STRING: u8 = 3;
const TAG_DELETE: u8 = 4;

/// Serializer for `DataEntry`
#[derive(Clone)]
pub struct DataEntrySerializer {
    u32_serializer: U32VarIntSerializer,
}

impl DataEntrySerializer {
    /// Creates a new serializer for `DataEntry`
    pub const fn new() -> Self {
        Self {
            u32_serializer: U32VarIntSerializer::new(),
        }
    }
}

impl Default for DataEntrySerializer {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializer<DataEntry> for DataEntrySerializer {
    fn serialize(&self, value: &DataEntry, buffer: &mut Vec<u8>) -> Result<(), SerializeError> {
        let key_bytes = value.key.as_bytes();
        if key_bytes.len() > MAX_DATA_KEY_BYTES {
            return Err(SerializeError::StringTooBig(format!(
                "data entry key is {} bytes",
                key_bytes.len()
            )));
        }
        self.u32_serializer
            .serialize(&(key_bytes.len() as u32), buffer)?;
        buffer.extend_from_slice(key_bytes);
        match &value.value {
            DataValue::Integer(int) => {
                buffer.push(TAG_INTEGER);
                buffer.extend_from_slice(&int.to_be_bytes());
            }
            DataValue::Boolean(flag) => {
                buffer.push(TAG_BOOLEAN);
                buffer.push(u8::from(*flag));
            }
            DataValue::Binary(bytes) => {
                if bytes.len() > MAX_DATA_VALUE_BYTES {
                    return Err(SerializeError::GeneralError(format!(
                        "binary data entry value is {} bytes",
                        bytes.len()
                    )));
                }
                buffer.push(TAG_BINARY);
                self.u32_serializer
                    .serialize(&(bytes.len() as u32), buffer)?;
                buffer.extend_from_slice(bytes);
            }
            DataValue::String(text) => {
                let text_bytes = text.as_bytes();
                if text_bytes.len() > MAX_DATA_VALUE_BYTES {
                    return Err(SerializeError::StringTooBig(format!(
                        "string data entry value is {} bytes",
                        text_bytes.len()
                    )));
                }
                buffer.push(TAG_STRING);
                self.u32_serializer
                    .serialize(&(text_bytes.len() as u32), buffer)?;
                buffer.extend_from_slice(text_bytes);
            }
            DataValue::Delete => {
                buffer.push(TAG_DELETE);
            }
        }
        Ok(())
    }
}

/// Deserializer for `DataEntry`
#[derive(Clone)]
pub struct DataEntryDeserializer {
    key_length_deserializer: U32VarIntDeserializer,
    value_length_deserializer: U32VarIntDeserializer,
}

impl DataEntryDeserializer {
    /// Creates a new deserializer for `DataEntry`
    pub const fn new() -> Self {
        Self {
            key_length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_DATA_KEY_BYTES as u32),
            ),
            value_length_deserializer: U32VarIntDeserializer::new(
                Included(0),
                Included(MAX_DATA_VALUE_BYTES as u32),
            ),
        }
    }
}

impl Default for DataEntryDeserializer {
    fn default() -> Self {
        Self::new()
    }
}

fn take_utf8<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
    input: &'a [u8],
    length: usize,
) -> IResult<&'a [u8], String, E> {
    if input.len() < length {
        return Err(nom::Err::Error(ParseError::from_error_kind(
            input,
            nom::error::ErrorKind::LengthValue,
        )));
    }
    let text = std::str::from_utf8(&input[..length]).map_err(|_| {
        nom::Err::Error(ParseError::from_error_kind(
            input,
            nom::error::ErrorKind::Fail,
        ))
    })?;
    Ok((&input[length..], text.to_string()))
}

impl Deserializer<DataEntry> for DataEntryDeserializer {
    fn deserialize<'a, E: ParseError<&'a [u8]> + ContextError<&'a [u8]>>(
        &self,
        buffer: &'a [u8],
    ) -> IResult<&'a [u8], DataEntry, E> {
        context("Failed data entry deserialization", |input: &'a [u8]| {
            let (rest, key_length) = self.key_length_deserializer.deserialize(input)?;
            let (rest, key) = take_utf8(rest, key_length as usize)?;
            let (rest, tag) = nom::number::complete::be_u8(rest)?;
            let (rest, value) = match tag {
                TAG_INTEGER => {
                    let (rest, int) = nom::number::complete::be_i64(rest)?;
                    (rest, DataValue::Integer(int))
                }
                TAG_BOOLEAN => {
                    let (rest, byte) = nom::number::complete::be_u8(rest)?;
                    (rest, DataValue::Boolean(byte != 0))
                }
                TAG_BINARY => {
                    let (rest, length) = self.value_length_deserializer.deserialize(rest)?;
                    let (rest, bytes) = count(nom::number::complete::be_u8, length as usize)(rest)?;
                    (rest, DataValue::Binary(bytes))
                }
                TAG_STRING => {
                    let (rest, length) = self.value_length_deserializer.deserialize(rest)?;
                    let (rest, text) = take_utf8(rest, length as usize)?;
                    (rest, DataValue::String(text))
                }
                TAG_DELETE => (rest, DataValue::Delete),
                _ => {
                    return Err(nom::Err::Error(ParseError::from_error_kind(
                        input,
                        nom::error::ErrorKind::Fail,
                    )))
                }
            };
            Ok((rest, DataEntry { key, value }))
        })(buffer)
    }
}
