// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use serde::{Deserialize, Serialize};
use waves_models::config::{
    CHANNEL_SIZE, MAX_BLOCK_GAS, MAX_BLOCK_SIZE_BYTES, MAX_ROLLBACK, ORPHAN_BUFFER_CAPACITY,
};
use waves_models::scheme::Scheme;

/// Chain worker configuration
#[derive(Debug, Deserialize, Serialize, Clone, Copy)]
pub struct ChainConfig {
    /// network this chain belongs to
    pub scheme: Scheme,
    /// deepest reorganization the applier will perform
    pub max_rollback: u64,
    /// capacity of the parent-waiting orphan buffer
    pub orphan_buffer_capacity: usize,
    /// capacity of the applier command queue
    pub channel_size: usize,
    /// byte budget handed to UTX selection for block production
    pub block_byte_budget: u64,
    /// gas budget handed to UTX selection for block production
    pub block_gas_budget: u64,
}

impl ChainConfig {
    /// Default configuration for the given network.
    pub fn new(scheme: Scheme) -> Self {
        ChainConfig {
            scheme,
            max_rollback: MAX_ROLLBACK,
            orphan_buffer_capacity: ORPHAN_BUFFER_CAPACITY,
            channel_size: CHANNEL_SIZE,
            block_byte_budget: MAX_BLOCK_SIZE_BYTES,
            block_gas_budget: MAX_BLOCK_GAS,
        }
    }
}
