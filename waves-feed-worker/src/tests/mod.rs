// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! # L2 feed scenarios
//!
//! Subscription, resumption across a simulated crash, stale-fork rewind,
//! acknowledgement persistence and the ack-window back-pressure on the
//! publishing side.

mod scenarios;
mod tools;
