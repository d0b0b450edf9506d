// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use serde::{Deserialize, Serialize};
use waves_models::config::{
    CHANNEL_SIZE, DEFAULT_MAX_UTX_BYTES, DEFAULT_MAX_UTX_COUNT, DEFAULT_UTX_TTL,
    REPLACEMENT_FEE_BUMP_PERCENT,
};
use waves_models::scheme::Scheme;
use waves_time::WavesTime;

/// UTX pool configuration
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct UtxConfig {
    /// network the pool admits transactions for
    pub scheme: Scheme,
    /// maximum number of pooled entries
    pub max_utx_count: usize,
    /// maximum total serialized bytes of pooled entries
    pub max_utx_bytes: u64,
    /// time-to-live of a pooled entry
    pub utx_ttl: WavesTime,
    /// fee-density bump, in percent, required to displace entries from a
    /// full pool
    pub replacement_fee_bump_percent: u64,
    /// capacity of the worker command queue
    pub channel_size: usize,
    /// interval between housekeeping sweeps
    pub housekeep_interval: WavesTime,
}

impl Default for UtxConfig {
    fn default() -> Self {
        UtxConfig {
            scheme: Scheme::MAINNET,
            max_utx_count: DEFAULT_MAX_UTX_COUNT,
            max_utx_bytes: DEFAULT_MAX_UTX_BYTES,
            utx_ttl: DEFAULT_UTX_TTL,
            replacement_fee_bump_percent: REPLACEMENT_FEE_BUMP_PERCENT,
            channel_size: CHANNEL_SIZE,
            housekeep_interval: WavesTime::from_millis(5_000),
        }
    }
}
