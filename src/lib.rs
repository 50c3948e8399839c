//! # Hybrid-Consensus
//!
//! Hybrid proof-of-work / proof-of-stake consensus core: algorithm scheduling,
//! per-algorithm difficulty, work-hash dispatch, stake-modifier chaining,
//! stake kernel validation, coinstake construction and cold-staking
//! delegation.
//!
//! ## Architecture
//!
//! Everything that can be a pure function is one: scheduling, difficulty,
//! hashing, kernel checks and coinstake rules are deterministic functions of
//! caller-supplied inputs, so two independent nodes validating the same chain
//! produce bit-identical results. The only mutable state — the stake-modifier
//! memoization cache and the delegation registry — lives in
//! [`HybridConsensus`], an explicit context object constructed once at node
//! startup and shared between the production and validation threads.
//!
//! Chain state and the UTXO set belong to the embedding node and are consumed
//! through the narrow [`ChainView`] and [`UtxoSnapshot`] traits.
//!
//! ## Usage
//!
//! ```rust
//! use hybrid_consensus::{Algorithm, HybridConsensus};
//!
//! let consensus = HybridConsensus::default();
//! assert_eq!(consensus.select_algo(0), Algorithm::Sha256d);
//! assert_eq!(consensus.select_algo(10), Algorithm::Pos);
//! ```

pub mod algo;
pub mod block;
pub mod coinstake;
pub mod constants;
pub mod delegation;
pub mod difficulty;
pub mod error;
pub mod kernel;
pub mod modifier;
pub mod pow;
pub mod selector;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use difficulty::SolveTimeWindow;
pub use error::{ConsensusError, Result};
pub use types::*;

use delegation::DelegationRegistry;
use modifier::ModifierCache;

/// Consensus context: parameters plus the crate's only shared mutable state.
///
/// # Examples
///
/// ```
/// use hybrid_consensus::HybridConsensus;
///
/// let consensus = HybridConsensus::default();
/// consensus.delegate(&[0x51], &[0x52]);
/// assert_eq!(consensus.staker_for(&[0x51]), Some(vec![0x52]));
/// ```
#[derive(Debug, Default)]
pub struct HybridConsensus {
    params: StakeParams,
    modifiers: ModifierCache,
    delegations: DelegationRegistry,
}

impl HybridConsensus {
    /// Create a consensus context with explicit staking parameters.
    pub fn new(params: StakeParams) -> Self {
        HybridConsensus {
            params,
            modifiers: ModifierCache::new(),
            delegations: DelegationRegistry::new(),
        }
    }

    pub fn params(&self) -> &StakeParams {
        &self.params
    }

    // --- scheduling ---

    /// Production method for a height under this context's stake interval.
    pub fn select_algo(&self, height: u32) -> Algorithm {
        algo::select_algo(height, self.params.pos_interval)
    }

    /// Whether the block at `height` must be stake-produced.
    pub fn should_be_stake_block(&self, height: u32) -> bool {
        algo::should_be_stake_block(height, self.params.pos_interval)
    }

    // --- difficulty ---

    /// Compact target for the next block of the window's algorithm.
    pub fn next_work_required(&self, window: &SolveTimeWindow, height: u32) -> u32 {
        difficulty::next_work_required(window, height)
    }

    // --- proof of work ---

    /// Work hash of serialized header bytes under `algo`.
    pub fn pow_hash(&self, header_bytes: &[u8], algo: Algorithm) -> Result<Hash> {
        pow::pow_hash(header_bytes, algo)
    }

    /// Check a work header's digest against its compact target.
    pub fn check_proof_of_work(&self, header: &BlockHeader) -> Result<bool> {
        pow::check_proof_of_work(header)
    }

    // --- stake modifier ---

    /// Stake modifier for the block with the given hash.
    pub fn stake_modifier(&self, chain: &dyn ChainView, block_hash: &Hash) -> Result<u64> {
        self.modifiers.modifier(chain, block_hash)
    }

    /// Evict a disconnected block's modifier entry (chain reorganization).
    pub fn invalidate_modifier(&self, block_hash: &Hash) {
        self.modifiers.invalidate(block_hash)
    }

    // --- stake kernels ---

    /// Assemble a kernel for a staking attempt on top of `tip_hash`.
    pub fn make_stake_kernel(
        &self,
        chain: &dyn ChainView,
        tip_hash: &Hash,
        tx_time: u32,
    ) -> Result<StakeKernel> {
        kernel::make_stake_kernel(chain, &self.modifiers, tip_hash, tx_time)
    }

    /// Check one input/kernel combination against the stake target.
    pub fn validate_stake_kernel(
        &self,
        input: &StakeInput,
        kernel: &StakeKernel,
        stake_target: u32,
    ) -> StakeValidationResult {
        kernel::validate_stake_kernel(input, kernel, stake_target, &self.params)
    }

    /// Clock-window and grid check for a coinstake timestamp.
    pub fn is_valid_stake_timestamp(&self, tx_time: u32, now: u32) -> bool {
        kernel::is_valid_stake_timestamp(tx_time, now, &self.params)
    }

    // --- stake input selection ---

    /// Eligible stake inputs for a script, sorted by creation height.
    pub fn eligible_inputs(
        &self,
        owner_script: &[u8],
        snapshot: &dyn UtxoSnapshot,
        now: u32,
    ) -> Vec<StakeInput> {
        selector::eligible_inputs(owner_script, snapshot, now, &self.params)
    }

    /// Aggregate staking statistics for a script.
    pub fn stake_stats(
        &self,
        owner_script: &[u8],
        snapshot: &dyn UtxoSnapshot,
        now: u32,
    ) -> StakeStats {
        selector::stake_stats(owner_script, snapshot, now, &self.params)
    }

    // --- coinstake ---

    /// Maximum stake reward at a height.
    pub fn stake_reward(&self, height: u32) -> Amount {
        coinstake::stake_reward(height, &self.params)
    }

    /// Build the coinstake transaction for a stake-produced block.
    pub fn build_coinstake(
        &self,
        inputs: &[StakeInput],
        staker_script: &[u8],
        tx_time: u32,
        height: u32,
    ) -> Result<CoinstakeTransaction> {
        coinstake::build_coinstake(inputs, staker_script, tx_time, height, &self.params)
    }

    /// Validate a received coinstake against the resolved stake inputs.
    pub fn validate_coinstake(
        &self,
        tx: &CoinstakeTransaction,
        staked_inputs: &[StakeInput],
        height: u32,
        now: u32,
    ) -> Result<()> {
        coinstake::validate_coinstake(tx, staked_inputs, height, now, &self.params)
    }

    // --- cold staking ---

    /// Delegate staking for an owner script to a staker script.
    pub fn delegate(&self, owner_script: &[u8], staker_script: &[u8]) {
        self.delegations.delegate(owner_script, staker_script)
    }

    /// Revoke an owner's delegation. Returns whether one existed.
    pub fn revoke(&self, owner_script: &[u8]) -> bool {
        self.delegations.revoke(owner_script)
    }

    /// The delegated staker script for an owner, if any.
    pub fn staker_for(&self, owner_script: &[u8]) -> Option<ByteString> {
        self.delegations.staker_for(owner_script)
    }
}
