// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;

/// Errors of the router component, mapped by the outer surface to its own
/// representation (HTTP status, peer protocol reason).
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// bad request: {0}
    BadRequest(String),
    /// authentication failed
    AuthFailed,
    /// timed out waiting for the internal verdict
    Timeout,
    /// internal queue is full
    QueueFull,
    /// internal error: {0}
    InternalError(String),
}
