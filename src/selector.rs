//! Stake input selection over a read-only UTXO snapshot

use crate::kernel::{is_input_eligible, stake_weight};
use crate::types::{StakeInput, StakeParams, StakeStats, UtxoSnapshot};

/// EligibleInputs: 𝕊 × 𝒰 × ℕ → 𝒮*
///
/// All unspent outputs locked to `owner_script` that pass the eligibility
/// rule at `now`, sorted by creation height ascending for reproducible
/// output. Pure relative to the snapshot; nothing is cached here.
pub fn eligible_inputs(
    owner_script: &[u8],
    snapshot: &dyn UtxoSnapshot,
    now: u32,
    params: &StakeParams,
) -> Vec<StakeInput> {
    let mut inputs: Vec<StakeInput> = snapshot
        .outputs_for_script(owner_script)
        .into_iter()
        .filter(|input| is_input_eligible(input, now, params))
        .collect();
    inputs.sort_by_key(|input| (input.height, input.txid, input.vout));
    inputs
}

/// Aggregate staking statistics for one script's view of the snapshot.
pub fn stake_stats(
    owner_script: &[u8],
    snapshot: &dyn UtxoSnapshot,
    now: u32,
    params: &StakeParams,
) -> StakeStats {
    let all = snapshot.outputs_for_script(owner_script);
    let mut stats = StakeStats {
        total_inputs: all.len() as u32,
        ..StakeStats::default()
    };
    for input in &all {
        if is_input_eligible(input, now, params) {
            stats.eligible_inputs += 1;
            stats.total_stake_amount += input.amount;
            stats.total_stake_weight += stake_weight(input, now, params);
        }
    }
    stats
}
