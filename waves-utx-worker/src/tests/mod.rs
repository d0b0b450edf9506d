// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! # Internal UTX pool unit tests
//!
//! Covers the admission verdicts, the fee-density selection order with its
//! determinism and monotonicity guarantees, the capacity and time-to-live
//! eviction sweeps, and the asynchronous gossip path through the worker
//! thread.

mod tools;
