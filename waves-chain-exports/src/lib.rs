// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Exports for the chain worker: configuration, commands, events, the
//! controller trait and error kinds.

mod block_status;
mod channels;
mod commands;
mod config;
mod controller_trait;
mod error;
mod events;

pub use block_status::BlockGraphStatus;
pub use channels::ChainChannels;
pub use commands::{BlockOrigin, ChainCommand};
pub use config::ChainConfig;
pub use controller_trait::{ChainController, ChainManager};
pub use error::ChainError;
pub use events::ChainEvent;
