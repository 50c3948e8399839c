//! Hybrid consensus constants

/// Shahi per coin
pub const COIN: u64 = 100_000_000;

/// Number of proof-of-work algorithms in the rotation
pub const ALGO_COUNT: u32 = 3;

/// Every nth block is produced by stake (genesis excepted)
pub const POS_BLOCK_INTERVAL: u32 = 10;

/// Minimum stake amount: 333 coins
pub const MIN_STAKE_AMOUNT: u64 = 333 * COIN;

/// Minimum coin age before an output may stake: 1 hour
pub const MIN_STAKE_AGE: u32 = 3600;

/// Maximum coin age counted toward stake weight: 90 days
pub const MAX_STAKE_AGE: u32 = 90 * 24 * 3600;

/// Flat per-block stake reward: 5 coins
pub const STAKE_REWARD: u64 = 5 * COIN;

/// Stake weight accrues per full day of coin age
pub const SECONDS_PER_DAY: u32 = 86_400;

/// Target spacing between work blocks: 10 minutes
pub const WORK_TARGET_SPACING: u32 = 600;

/// Target spacing between stake blocks: 2.5 minutes
pub const STAKE_TARGET_SPACING: u32 = 150;

/// Allowed skew between a coinstake timestamp and the validator clock
pub const STAKE_TIMESTAMP_SLACK: u32 = 7200;

/// LWMA difficulty window: one day of work blocks
pub const LWMA_WINDOW: usize = 144;

/// Genesis/floor difficulty in compact form (minimum difficulty)
pub const FLOOR_BITS: u32 = 0x1d00ffff;

/// Difficulty may move at most this factor away from the floor per side
pub const TARGET_CLAMP_FACTOR: u64 = 4;

/// Version bit marking a hybrid-consensus header; bits 28-30 carry the algorithm
pub const HYBRID_VERSION_MARKER: u32 = 0x8000_0000;

/// Reward scaling divisor: weight of 1000 coins at zero age earns the base reward
pub const REWARD_WEIGHT_UNIT: u64 = 1000 * COIN;
