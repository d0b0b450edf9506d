// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! The L2 feed worker: a durable, resumable, back-pressured stream of
//! committed block records and contract data.
//!
//! Only the cursor is durable. Undelivered records are rebuilt from
//! committed state on subscribe, so a crash can never desynchronize the feed
//! from the chain: whatever the store committed is exactly what subscribers
//! are (re)sent, byte-identical.

mod controller_impl;
mod state;
mod worker;

pub use worker::start_feed_worker;

#[cfg(test)]
mod tests;
