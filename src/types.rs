//! Core types for hybrid PoW/PoS consensus validation

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit hash
pub type Hash = [u8; 32];

/// Byte string type (locking scripts, serialized headers)
pub type ByteString = Vec<u8>;

/// Amount type: shahi (10^-8 coin)
pub type Amount = u64;

/// Block production algorithm: 𝔸 = {sha256d, scrypt, groestl, pos}
///
/// Closed set; the derived ordering exists only for rotation arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Algorithm {
    Sha256d = 0,
    Scrypt = 1,
    Groestl = 2,
    Pos = 3,
}

/// Block type tag: work-produced or stake-produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum BlockType {
    Work = 0,
    Stake = 1,
}

/// Block Header: ℋ = ℕ × ℍ × ℍ × ℕ × ℕ × ℕ × 𝔸 × 𝔹 (× ℍ × ℕ × ℍ when stake)
///
/// The stake fields are consensus-meaningful only when `block_type` is
/// [`BlockType::Stake`]; the wire codec omits them for work blocks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockHeader {
    pub version: u32,
    pub prev_block_hash: Hash,
    pub merkle_root: Hash,
    pub timestamp: u32,
    pub bits: u32,
    pub nonce: u32,
    pub algorithm: Algorithm,
    pub block_type: BlockType,
    pub stake_tx_hash: Hash,
    pub stake_time: u32,
    pub stake_kernel_hash: Hash,
}

impl BlockHeader {
    pub fn is_proof_of_stake(&self) -> bool {
        self.block_type == BlockType::Stake
    }

    pub fn is_proof_of_work(&self) -> bool {
        self.block_type == BlockType::Work
    }

    /// Set the production algorithm, keeping the explicit tag, the version-bit
    /// encoding and the block-type tag mutually consistent.
    pub fn set_algorithm(&mut self, algo: Algorithm) {
        self.algorithm = algo;
        self.version = crate::algo::algo_to_version(algo);
        self.block_type = if algo == Algorithm::Pos {
            BlockType::Stake
        } else {
            BlockType::Work
        };
    }
}

/// Block index entry: position of one block in the chain
///
/// Supplied by the external chain-state provider; this crate never builds one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockIndex {
    pub hash: Hash,
    pub prev_hash: Hash,
    pub height: u32,
    pub time: u32,
}

/// Read-only view of chain state, exposed by the containing node.
pub trait ChainView {
    /// Look up a block index entry by block hash.
    fn block_index(&self, hash: &Hash) -> Option<BlockIndex>;
}

/// Unspent output candidate for staking
///
/// Borrowed from the UTXO provider's snapshot; never mutated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeInput {
    pub txid: Hash,
    pub vout: u32,
    pub amount: Amount,
    /// Time the output became spendable
    pub time: u32,
    /// Height the output was created at
    pub height: u32,
    pub script_pubkey: ByteString,
    pub spent: bool,
}

/// Read-only UTXO snapshot, exposed by the external UTXO provider.
pub trait UtxoSnapshot {
    /// All unspent outputs locked to the given script.
    fn outputs_for_script(&self, script_pubkey: &[u8]) -> Vec<StakeInput>;
}

/// Stake kernel: the per-attempt tuple checked against the weighted target
///
/// Constructed fresh for every validation attempt; not persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeKernel {
    pub stake_modifier: u64,
    pub tx_time: u32,
    pub prev_block_time: u32,
    pub prev_block_hash: Hash,
}

/// Reason a stake kernel attempt was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeRejection {
    /// Input fails the amount/age/spent eligibility checks
    IneligibleInput,
    /// Transaction time off the spacing grid or outside the clock window
    InvalidTimestamp,
    /// Kernel hash not below the weighted target (the common case in a search)
    KernelMiss,
}

/// Outcome of a stake kernel check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeValidationResult {
    pub valid: bool,
    pub rejection: Option<StakeRejection>,
    pub stake_weight: u64,
    pub kernel_hash: u64,
}

/// Transaction input: a reference to the spent output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub txid: Hash,
    pub vout: u32,
    pub sequence: u32,
}

/// Transaction output: 𝒯 = ℤ × 𝕊
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: Amount,
    pub script_pubkey: ByteString,
}

/// Coinstake transaction: spends the stake inputs, pays the reward to the
/// staker and returns the principal to the owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinstakeTransaction {
    pub time: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
}

impl CoinstakeTransaction {
    /// Sum of output values, widened to u128 so adversarial values cannot
    /// wrap the sum.
    pub fn total_output(&self) -> u128 {
        self.outputs.iter().map(|o| o.value as u128).sum()
    }
}

/// Staking parameters, supplied explicitly by the embedding node
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeParams {
    /// Minimum coin age before an output may stake (seconds)
    pub min_stake_age: u32,
    /// Coin-age cap for both eligibility and weighting (seconds)
    pub max_stake_age: u32,
    /// Minimum stake amount (shahi)
    pub min_stake_amount: Amount,
    /// Flat per-block stake reward (shahi)
    pub stake_reward: Amount,
    /// Every nth block is stake-produced
    pub pos_interval: u32,
    /// Stake block spacing; coinstake timestamps must sit on this grid (seconds)
    pub stake_spacing: u32,
    /// Allowed skew between a coinstake timestamp and the validator clock (seconds)
    pub timestamp_slack: u32,
}

impl Default for StakeParams {
    fn default() -> Self {
        StakeParams {
            min_stake_age: crate::constants::MIN_STAKE_AGE,
            max_stake_age: crate::constants::MAX_STAKE_AGE,
            min_stake_amount: crate::constants::MIN_STAKE_AMOUNT,
            stake_reward: crate::constants::STAKE_REWARD,
            pos_interval: crate::constants::POS_BLOCK_INTERVAL,
            stake_spacing: crate::constants::STAKE_TARGET_SPACING,
            timestamp_slack: crate::constants::STAKE_TIMESTAMP_SLACK,
        }
    }
}

/// Per-script staking statistics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakeStats {
    pub total_inputs: u32,
    pub eligible_inputs: u32,
    pub total_stake_amount: Amount,
    pub total_stake_weight: u64,
}
