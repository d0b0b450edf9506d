// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;

/// Errors of the state-store seam.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone)]
pub enum StateError {
    /// no block at height {0}
    UnknownHeight(u64),
    /// transaction {0} already confirmed
    TransactionAlreadyConfirmed(String),
    /// insufficient funds for {0}
    InsufficientFunds(String),
    /// cannot roll back the genesis block
    GenesisRollback,
    /// models error: {0}
    ModelsError(#[from] waves_models::ModelsError),
    /// commit failed: {0}
    CommitFailed(String),
    /// container inconsistency: {0}
    ContainerInconsistency(String),
}
