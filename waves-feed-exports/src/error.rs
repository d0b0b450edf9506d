// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>

use displaydoc::Display;
use thiserror::Error;

/// Errors of the feed component.
#[non_exhaustive]
#[derive(Display, Error, Debug, Clone, PartialEq, Eq)]
pub enum FeedError {
    /// the feed worker is gone
    Disconnected,
    /// the call was cancelled before a record arrived
    Cancelled,
    /// requested resume point is not on the canonical chain: {0}
    UnknownResumePoint(String),
    /// cursor persistence failed: {0}
    CursorPersistence(String),
    /// acknowledged point {0} was never delivered
    BadAck(String),
    /// another subscriber already holds the feed
    AlreadySubscribed,
    /// wire encoding error: {0}
    WireError(String),
    /// channel error: {0}
    ChannelError(String),
}
