// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

//! Build here the default node settings from the configuration file toml

use serde::Deserialize;
use std::path::PathBuf;
use waves_models::config::build_waves_settings;

lazy_static::lazy_static! {
    pub static ref SETTINGS: Settings = build_waves_settings("waves-node", "WAVES_NODE");
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct NetworkSettings {
    /// chain id character: 'W' mainnet, 'T' testnet, anything else custom
    pub scheme: char,
    /// admin API key; empty disables the admin surface
    pub api_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenesisBalanceSettings {
    pub address: String,
    pub amount: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GenesisSettings {
    /// bs58-check secret key signing the genesis block
    pub secret: String,
    /// genesis timestamp, milliseconds
    pub timestamp: u64,
    /// initial proof-of-stake base target
    pub base_target: u64,
    /// initial account funding
    pub initial_balances: Vec<GenesisBalanceSettings>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageSettings {
    /// directory holding the feed cursor and other durable artifacts
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub network: NetworkSettings,
    pub genesis: GenesisSettings,
    pub storage: StorageSettings,
}
