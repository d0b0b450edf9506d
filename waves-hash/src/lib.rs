// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Cryptographic digests used for every chain identifier.

#![warn(missing_docs)]

mod error;
mod hash;
mod settings;

pub use error::WavesHashError;
pub use hash::{Hash, HashDeserializer, HashSerializer};
pub use settings::HASH_SIZE_BYTES;
