// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

/// Size of a serialized digest, in bytes.
pub const HASH_SIZE_BYTES: usize = 32;
