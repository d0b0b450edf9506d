// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! The message router: demultiplexes inbound typed messages into the
//! applier queue, the UTX pool and the peer manager, and carries the
//! authenticated admin broadcast path with its fixed reply deadline.

mod controller_impl;
mod worker;

pub use worker::start_protocol_controller;

#[cfg(test)]
mod tests;
