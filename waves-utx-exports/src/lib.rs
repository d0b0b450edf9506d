// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Exports for the unconfirmed-transactions pool: configuration, controller
//! traits and admission error kinds.

mod config;
mod controller_traits;
mod error;

pub use config::UtxConfig;
pub use controller_traits::{UtxController, UtxManager, UtxStats};
pub use error::AdmissionError;
