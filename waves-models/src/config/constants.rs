//! DEFAULT VALUES USED TO INITIALIZE DIVERS CONFIGURATION STRUCTURES
//!
//! The hard-coded protocol parameters below never change at runtime; each
//! worker crate takes them through its `Config` struct by dependency
//! injection, which keeps unit tests free to use other values.

use crate::amount::Amount;
use waves_time::WavesTime;

/// Default bound for worker command queues.
pub const CHANNEL_SIZE: usize = 1024;

/// Target interval between blocks.
pub const BLOCK_TARGET_INTERVAL: WavesTime = WavesTime::from_millis(60_000);
/// Number of trailing blocks whose timings drive base target retargeting.
pub const BASE_TARGET_WINDOW: u64 = 100;
/// Maximum per-block base target adjustment, in percent.
pub const BASE_TARGET_MAX_ADJUST_PERCENT: u64 = 10;
/// Depth at which the generating balance is measured for PoS eligibility.
pub const GENERATING_BALANCE_DEPTH: u64 = 1000;
/// Minimum generating balance required to produce blocks.
pub const MIN_GENERATING_BALANCE: Amount = Amount::from_raw(1_000_00000000);
/// How far in the future a block timestamp may lie, in milliseconds.
pub const MAX_TIMESTAMP_DRIFT_MS: u64 = 100;

/// Deepest reorganization the applier will perform.
pub const MAX_ROLLBACK: u64 = 2000;
/// Capacity of the parent-waiting orphan buffer; the oldest entry is evicted.
pub const ORPHAN_BUFFER_CAPACITY: usize = 256;

/// How many blocks ahead of the last acknowledged one the L2 feed may buffer.
pub const FEED_ACK_WINDOW: u64 = 1024;

/// Default cap on the number of pooled unconfirmed transactions.
pub const DEFAULT_MAX_UTX_COUNT: usize = 100_000;
/// Default cap on the total serialized bytes of pooled transactions.
pub const DEFAULT_MAX_UTX_BYTES: u64 = 64 * 1024 * 1024;
/// Default unconfirmed transaction time-to-live.
pub const DEFAULT_UTX_TTL: WavesTime = WavesTime::from_millis(90 * 60 * 1000);
/// Minimum acceptable transaction fee.
pub const MIN_TRANSACTION_FEE: Amount = Amount::from_raw(100_000);
/// Fee-density ratio a replacing transaction must exceed, in percent.
pub const REPLACEMENT_FEE_BUMP_PERCENT: u64 = 10;

/// Fixed deadline for admin broadcast replies.
pub const ADMIN_BROADCAST_TIMEOUT: WavesTime = WavesTime::from_millis(5_000);

/// Maximum number of transactions in one block.
pub const MAX_TRANSACTIONS_PER_BLOCK: u32 = 65_535;
/// Maximum total serialized size of a block's transactions, in bytes.
pub const MAX_BLOCK_SIZE_BYTES: u64 = 1024 * 1024;
/// Gas budget of a block, spent by invoke-script transactions.
pub const MAX_BLOCK_GAS: u64 = 2_500_000;
/// Gas charged for one invoke-script transaction.
pub const GAS_COST_INVOKE: u64 = 500_000;
/// Gas charged for any other transaction.
pub const GAS_COST_FLAT: u64 = 1_000;

/// Per-block generation reward.
pub const BLOCK_REWARD: Amount = Amount::from_raw(6_00000000);

lazy_static::lazy_static! {
    /// Node version advertised to peers and logs.
    pub static ref VERSION: String = "WAVES.1.4".to_string();
}
