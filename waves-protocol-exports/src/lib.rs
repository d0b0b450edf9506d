// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Exports for the message router: inbound message types, the peer-manager
//! seam and router error kinds.

mod config;
mod controller_trait;
mod error;
mod messages;
mod peer_manager;

pub use config::ProtocolConfig;
pub use controller_trait::{ProtocolController, ProtocolManager};
pub use error::ProtocolError;
pub use messages::{Message, MessageCategoryId};
pub use peer_manager::PeerManager;
#[cfg(feature = "testing")]
pub use peer_manager::MockPeerManager;
