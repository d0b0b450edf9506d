// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! # Router unit tests
//!
//! Demultiplexing of each message kind and the authenticated admin
//! broadcast path, including the fixed-deadline timeout against a stalled
//! applier queue.

mod tools;
