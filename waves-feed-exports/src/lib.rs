// Copyright (c) 2022 WAVES PLATFORM <dev@wavesplatform.com>
//! Exports for the L2 feed: the wire record schema with its pinned field
//! numbers, the durable cursor, and the sink/subscription traits.

mod config;
mod controller_traits;
mod cursor;
mod error;
mod records;

pub use config::FeedConfig;
pub use controller_traits::{FeedController, FeedManager, FeedSink, FeedSubscription};
pub use cursor::FeedCursor;
pub use error::FeedError;
pub use records::{
    BlockHeaderRecord, BlockInfoRecord, DataEntryRecord, DataEntryValue, FeedRecord,
    L2ContractDataEntriesRecord, RollbackRecord,
};
