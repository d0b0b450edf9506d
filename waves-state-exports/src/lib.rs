// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! State-store seam consumed by the block pipeline.
//!
//! The core only requires atomic begin/commit semantics, snapshot reads and
//! durable writes; the persistent key/value layout is an external concern.
//! `MemoryStateStore` is the reference implementation used by the node in
//! standalone mode and by every worker test.

mod controller_traits;
mod error;
mod memory_store;
mod overlay;

pub use controller_traits::{StateReader, StateStore, StateTransaction};
pub use error::StateError;
pub use memory_store::MemoryStateStore;
pub use overlay::{BlockDiff, StateOverlay};
