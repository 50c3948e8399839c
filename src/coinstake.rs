//! Coinstake construction and validation

use crate::constants::REWARD_WEIGHT_UNIT;
use crate::error::{ConsensusError, Result};
use crate::kernel::{is_valid_stake_timestamp, stake_weight};
use crate::types::{
    Amount, CoinstakeTransaction, StakeInput, StakeParams, TransactionInput, TransactionOutput,
};

/// GetStakeReward: ℕ → ℤ
///
/// Maximum stake reward at a height. Flat schedule.
pub fn stake_reward(_height: u32, params: &StakeParams) -> Amount {
    params.stake_reward
}

/// Reward earned by a set of stake inputs at `tx_time`.
///
/// Scales with total stake weight — one base reward per weight unit — and is
/// capped by the height's schedule so the cap invariant cannot be outrun by
/// large or old stakes.
pub fn coinstake_reward(
    inputs: &[StakeInput],
    tx_time: u32,
    height: u32,
    params: &StakeParams,
) -> Amount {
    let total_weight: u128 = inputs
        .iter()
        .map(|input| stake_weight(input, tx_time, params) as u128)
        .sum();
    let scaled = params.stake_reward as u128 * total_weight / REWARD_WEIGHT_UNIT as u128;
    let capped = scaled.min(stake_reward(height, params) as u128);
    capped as Amount
}

/// Build: 𝒮* × 𝕊 × ℕ → 𝒞𝒮
///
/// Assemble the coinstake for a stake-produced block: every input is spent,
/// output 0 pays the reward to the staker's script, output 1 returns the
/// principal to the owner's script (taken from the inputs). With delegation
/// the two scripts differ and the principal still goes back to the owner.
pub fn build_coinstake(
    inputs: &[StakeInput],
    staker_script: &[u8],
    tx_time: u32,
    height: u32,
    params: &StakeParams,
) -> Result<CoinstakeTransaction> {
    let first = inputs.first().ok_or_else(|| {
        ConsensusError::InvalidCoinstakeStructure("coinstake requires at least one input".to_string())
    })?;
    let owner_script = first.script_pubkey.clone();

    let total_input: Amount = inputs.iter().map(|input| input.amount).sum();
    let reward = coinstake_reward(inputs, tx_time, height, params);

    let tx_inputs = inputs
        .iter()
        .map(|input| TransactionInput {
            txid: input.txid,
            vout: input.vout,
            sequence: u32::MAX,
        })
        .collect();

    Ok(CoinstakeTransaction {
        time: tx_time,
        inputs: tx_inputs,
        outputs: vec![
            TransactionOutput {
                value: reward,
                script_pubkey: staker_script.to_vec(),
            },
            TransactionOutput {
                value: total_input,
                script_pubkey: owner_script,
            },
        ],
    })
}

/// Validate: 𝒞𝒮 × 𝒮* × ℕ × ℕ → Result
///
/// 1. Structure: at least one input and at least two outputs
/// 2. Timestamp: on the stake grid and within the clock window at `now`
/// 3. Value: Σoutputs ≤ Σinputs + GetStakeReward(height)
///
/// `staked_inputs` are the resolved previous outputs, supplied by the caller
/// from its UTXO view; this core does not read UTXO state itself.
pub fn validate_coinstake(
    tx: &CoinstakeTransaction,
    staked_inputs: &[StakeInput],
    height: u32,
    now: u32,
    params: &StakeParams,
) -> Result<()> {
    if tx.inputs.is_empty() {
        return Err(ConsensusError::InvalidCoinstakeStructure(
            "no inputs".to_string(),
        ));
    }
    if tx.outputs.len() < 2 {
        return Err(ConsensusError::InvalidCoinstakeStructure(format!(
            "{} outputs, need reward and principal return",
            tx.outputs.len()
        )));
    }

    if !is_valid_stake_timestamp(tx.time, now, params) {
        return Err(ConsensusError::InvalidTimestamp(format!(
            "coinstake time {}",
            tx.time
        )));
    }

    // Sums in u128: the transaction values are attacker-controlled and must
    // not wrap.
    let total_input: u128 = staked_inputs.iter().map(|input| input.amount as u128).sum();
    let total_output = tx.total_output();
    let max_output = total_input + stake_reward(height, params) as u128;
    if total_output > max_output {
        return Err(ConsensusError::RewardExceeded(format!(
            "outputs {total_output} exceed inputs {total_input} plus reward"
        )));
    }

    Ok(())
}
