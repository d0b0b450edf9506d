// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use serde::{Deserialize, Serialize};

/// Chain id byte selecting mainnet, testnet or a custom network.
///
/// The scheme enters every address derivation and every signature pre-image,
/// so a transaction signed for one network cannot replay on another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scheme(pub u8);

impl Scheme {
    /// Mainnet chain id (`'W'`).
    pub const MAINNET: Scheme = Scheme(b'W');
    /// Testnet chain id (`'T'`).
    pub const TESTNET: Scheme = Scheme(b'T');

    /// Raw chain id byte.
    pub const fn to_byte(self) -> u8 {
        self.0
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0 as char)
    }
}

impl From<u8> for Scheme {
    fn from(byte: u8) -> Self {
        Scheme(byte)
    }
}
