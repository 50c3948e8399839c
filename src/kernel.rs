//! Stake kernel validation

use crate::constants::SECONDS_PER_DAY;
use crate::error::{ConsensusError, Result};
use crate::modifier::ModifierCache;
use crate::types::{
    ChainView, Hash, StakeInput, StakeKernel, StakeParams, StakeRejection, StakeValidationResult,
};
use sha2::{Digest, Sha256};

/// IsEligible: 𝒮 × ℕ → {true, false}
///
/// An input may stake iff its amount meets the minimum, its age at `now`
/// lies within [min, max], and it is unspent.
pub fn is_input_eligible(input: &StakeInput, now: u32, params: &StakeParams) -> bool {
    if input.amount < params.min_stake_amount {
        return false;
    }
    if input.spent {
        return false;
    }
    let age = now.saturating_sub(input.time);
    age >= params.min_stake_age && age <= params.max_stake_age
}

/// Stake weight: amount · (1 + min(age, maxAge) / 86400)
///
/// Linear coin-age bonus, one amount-multiple per full day of age, capped at
/// the maximum stake age. Monotonically non-decreasing in age up to the cap,
/// strictly increasing in amount. Computed in u128 and saturated so an
/// extreme amount from the UTXO provider cannot wrap.
pub fn stake_weight(input: &StakeInput, now: u32, params: &StakeParams) -> u64 {
    let age = now.saturating_sub(input.time).min(params.max_stake_age);
    let weight = input.amount as u128 * (1 + (age / SECONDS_PER_DAY) as u128);
    weight.min(u64::MAX as u128) as u64
}

/// Kernel hash: first 8 bytes (little-endian) of
/// SHA256(modifier ‖ txTime ‖ prevBlockHash ‖ amount)
///
/// Integer fields are serialized little-endian at their natural widths. The
/// construction is a consensus rule; every node must produce the identical
/// value for the identical kernel.
pub fn kernel_hash(kernel: &StakeKernel, amount: u64) -> u64 {
    let mut hasher = Sha256::new();
    hasher.update(kernel.stake_modifier.to_le_bytes());
    hasher.update(kernel.tx_time.to_le_bytes());
    hasher.update(kernel.prev_block_hash);
    hasher.update(amount.to_le_bytes());
    let digest = hasher.finalize();
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&digest[..8]);
    u64::from_le_bytes(buf)
}

/// IsValidStakeTimestamp: ℕ × ℕ → {true, false}
///
/// A coinstake timestamp must sit on the stake-spacing grid and stay within
/// the slack window of the validator's clock, in both directions, to resist
/// timestamp grinding.
pub fn is_valid_stake_timestamp(tx_time: u32, now: u32, params: &StakeParams) -> bool {
    if tx_time % params.stake_spacing != 0 {
        return false;
    }
    if tx_time < now.saturating_sub(params.timestamp_slack) {
        return false;
    }
    tx_time <= now.saturating_add(params.timestamp_slack)
}

/// Validate: 𝒮 × 𝒦 × ℕ → StakeValidationResult
///
/// 1. Eligibility of the input at the kernel's transaction time
/// 2. Grid alignment of the kernel's transaction time
/// 3. weight = amount · (1 + min(age, maxAge) / 86400)
/// 4. kernelHash = SHA256-based mixing of (modifier, txTime, prevHash, amount)
/// 5. Accept iff kernelHash < target · weight
///
/// Deterministic over (input, kernel, target): the clock-window half of the
/// timestamp rule depends on the validator's clock and therefore lives in
/// [`is_valid_stake_timestamp`], checked by the caller alongside this. The
/// weighted target is computed in 128-bit arithmetic so it cannot wrap.
/// Rejection is data, never an error or a panic.
pub fn validate_stake_kernel(
    input: &StakeInput,
    kernel: &StakeKernel,
    stake_target: u32,
    params: &StakeParams,
) -> StakeValidationResult {
    if !is_input_eligible(input, kernel.tx_time, params) {
        return StakeValidationResult {
            valid: false,
            rejection: Some(StakeRejection::IneligibleInput),
            stake_weight: 0,
            kernel_hash: 0,
        };
    }

    if kernel.tx_time % params.stake_spacing != 0 {
        return StakeValidationResult {
            valid: false,
            rejection: Some(StakeRejection::InvalidTimestamp),
            stake_weight: 0,
            kernel_hash: 0,
        };
    }

    let weight = stake_weight(input, kernel.tx_time, params);
    let hash = kernel_hash(kernel, input.amount);
    let target = stake_target as u128 * weight as u128;
    let valid = (hash as u128) < target;

    StakeValidationResult {
        valid,
        rejection: if valid {
            None
        } else {
            Some(StakeRejection::KernelMiss)
        },
        stake_weight: weight,
        kernel_hash: hash,
    }
}

/// Assemble a kernel for a staking attempt on top of the current tip.
pub fn make_stake_kernel(
    chain: &dyn ChainView,
    modifiers: &ModifierCache,
    tip_hash: &Hash,
    tx_time: u32,
) -> Result<StakeKernel> {
    let tip = chain
        .block_index(tip_hash)
        .ok_or_else(|| ConsensusError::MissingBlockIndex("chain tip".to_string()))?;
    let stake_modifier = modifiers.modifier(chain, tip_hash)?;
    Ok(StakeKernel {
        stake_modifier,
        tx_time,
        prev_block_time: tip.time,
        prev_block_hash: tip.hash,
    })
}
