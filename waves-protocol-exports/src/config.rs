// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use serde::{Deserialize, Serialize};
use waves_models::config::{ADMIN_BROADCAST_TIMEOUT, CHANNEL_SIZE};
use waves_models::scheme::Scheme;
use waves_time::WavesTime;

/// Message router configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProtocolConfig {
    /// network the router accepts messages for
    pub scheme: Scheme,
    /// admin API key; an empty string disables admin authentication entirely
    /// (every admin call is then rejected)
    pub api_key: String,
    /// capacity of the inbound message queue
    pub channel_size: usize,
    /// fixed deadline on admin broadcast replies
    pub admin_broadcast_timeout: WavesTime,
}

impl ProtocolConfig {
    /// Default configuration for the given network and API key.
    pub fn new(scheme: Scheme, api_key: String) -> Self {
        ProtocolConfig {
            scheme,
            api_key,
            channel_size: CHANNEL_SIZE,
            admin_broadcast_timeout: ADMIN_BROADCAST_TIMEOUT,
        }
    }
}
