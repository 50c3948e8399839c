//! Integration tests for the stake production and validation flow

use hybrid_consensus::*;
use std::collections::HashMap;

const NOW: u32 = 1_700_000_100; // on the 150 s stake grid
const OWNER: &[u8] = &[0x51, 0x01];
const STAKER: &[u8] = &[0x52, 0x02];

struct TestChain {
    blocks: HashMap<Hash, BlockIndex>,
    tip: Hash,
}

impl TestChain {
    /// Linear chain of n blocks above genesis; block i has hash [i; 32].
    fn linear(n: u8) -> Self {
        let mut blocks = HashMap::new();
        for i in 1..=n {
            let prev = if i == 1 { [0u8; 32] } else { [i - 1; 32] };
            blocks.insert(
                [i; 32],
                BlockIndex {
                    hash: [i; 32],
                    prev_hash: prev,
                    height: i as u32,
                    time: NOW - 600 * (n - i) as u32,
                },
            );
        }
        TestChain {
            blocks,
            tip: [n; 32],
        }
    }
}

impl ChainView for TestChain {
    fn block_index(&self, hash: &Hash) -> Option<BlockIndex> {
        self.blocks.get(hash).cloned()
    }
}

struct TestSnapshot {
    outputs: Vec<StakeInput>,
}

impl UtxoSnapshot for TestSnapshot {
    fn outputs_for_script(&self, script_pubkey: &[u8]) -> Vec<StakeInput> {
        self.outputs
            .iter()
            .filter(|o| o.script_pubkey == script_pubkey)
            .cloned()
            .collect()
    }
}

fn output(amount: u64, age: u32, height: u32) -> StakeInput {
    StakeInput {
        txid: [height as u8; 32],
        vout: 0,
        amount,
        time: NOW - age,
        height,
        script_pubkey: OWNER.to_vec(),
        spent: false,
    }
}

/// Producer side: select inputs, derive the tip modifier, search the grid for
/// a passing kernel, build the coinstake. Validator side: re-check the kernel
/// and the coinstake.
#[test]
fn test_stake_block_production_and_validation_flow() {
    let consensus = HybridConsensus::default();
    let chain = TestChain::linear(9);
    let snapshot = TestSnapshot {
        outputs: vec![
            output(MIN_STAKE_AMOUNT, 2 * SECONDS_PER_DAY, 3),
            output(400 * COIN, 10 * SECONDS_PER_DAY, 5),
        ],
    };

    let height = 10;
    assert!(consensus.should_be_stake_block(height));

    let inputs = consensus.eligible_inputs(OWNER, &snapshot, NOW);
    assert_eq!(inputs.len(), 2);

    // A permissive target so the first aligned attempt lands.
    let stake_target = u32::MAX;
    let mut found = None;
    'search: for attempt in 0..4u32 {
        let tx_time = NOW + attempt * STAKE_TARGET_SPACING;
        let kernel = consensus
            .make_stake_kernel(&chain, &chain.tip, tx_time)
            .unwrap();
        for input in &inputs {
            let result = consensus.validate_stake_kernel(input, &kernel, stake_target);
            if result.valid {
                found = Some((input.clone(), kernel.clone(), result));
                break 'search;
            }
        }
    }
    let (input, kernel, result) = found.expect("kernel search should succeed");
    assert!(result.stake_weight >= input.amount);

    // Validator recomputes the identical kernel verdict.
    let revalidated = consensus.validate_stake_kernel(&input, &kernel, stake_target);
    assert_eq!(revalidated, result);
    assert!(consensus.is_valid_stake_timestamp(kernel.tx_time, NOW));

    let staked = vec![input];
    let coinstake = consensus
        .build_coinstake(&staked, STAKER, kernel.tx_time, height)
        .unwrap();
    consensus
        .validate_coinstake(&coinstake, &staked, height, NOW)
        .unwrap();

    // Reward goes to the staker, principal returns to the owner.
    assert_eq!(coinstake.outputs[0].script_pubkey, STAKER.to_vec());
    assert_eq!(coinstake.outputs[1].script_pubkey, OWNER.to_vec());
    assert_eq!(coinstake.outputs[1].value, staked[0].amount);
}

#[test]
fn test_kernel_miss_is_the_expected_search_outcome() {
    let consensus = HybridConsensus::default();
    let chain = TestChain::linear(4);
    let input = output(MIN_STAKE_AMOUNT, 2 * SECONDS_PER_DAY, 3);

    // Target 0 can never be met; every aligned attempt is a plain miss.
    for attempt in 0..8u32 {
        let tx_time = NOW + attempt * STAKE_TARGET_SPACING;
        let kernel = consensus
            .make_stake_kernel(&chain, &chain.tip, tx_time)
            .unwrap();
        let result = consensus.validate_stake_kernel(&input, &kernel, 0);
        assert!(!result.valid);
        assert_eq!(result.rejection, Some(StakeRejection::KernelMiss));
    }
}

#[test]
fn test_modifier_survives_reorg_rederivation() {
    let consensus = HybridConsensus::default();
    let chain = TestChain::linear(6);

    let before = consensus.stake_modifier(&chain, &chain.tip).unwrap();

    // Disconnect the top two blocks, then re-derive from ancestors.
    consensus.invalidate_modifier(&[6; 32]);
    consensus.invalidate_modifier(&[5; 32]);
    let after = consensus.stake_modifier(&chain, &chain.tip).unwrap();

    assert_eq!(before, after);
}

#[test]
fn test_modifier_unknown_block_rejected() {
    let consensus = HybridConsensus::default();
    let chain = TestChain::linear(3);
    let err = consensus.stake_modifier(&chain, &[77; 32]).unwrap_err();
    assert!(matches!(err, ConsensusError::StaleModifier(_)));
}

#[test]
fn test_cold_staking_delegation_flow() {
    let consensus = HybridConsensus::default();
    let chain = TestChain::linear(9);
    let snapshot = TestSnapshot {
        outputs: vec![output(MIN_STAKE_AMOUNT, 2 * SECONDS_PER_DAY, 3)],
    };

    // Owner delegates to a hot staker; the owner's coins stay selectable.
    consensus.delegate(OWNER, STAKER);
    let staker_script = consensus.staker_for(OWNER).expect("delegation active");
    let inputs = consensus.eligible_inputs(OWNER, &snapshot, NOW);
    assert_eq!(inputs.len(), 1);

    let kernel = consensus.make_stake_kernel(&chain, &chain.tip, NOW).unwrap();
    let result = consensus.validate_stake_kernel(&inputs[0], &kernel, u32::MAX);
    assert!(result.valid);

    let coinstake = consensus
        .build_coinstake(&inputs, &staker_script, NOW, 10)
        .unwrap();
    // Reward to the delegate, principal back to the owner.
    assert_eq!(coinstake.outputs[0].script_pubkey, STAKER.to_vec());
    assert_eq!(coinstake.outputs[1].script_pubkey, OWNER.to_vec());

    // After revocation the owner stakes for itself again.
    assert!(consensus.revoke(OWNER));
    assert_eq!(consensus.staker_for(OWNER), None);
}

#[test]
fn test_validator_rejects_inflated_coinstake() {
    let consensus = HybridConsensus::default();
    let staked = vec![output(MIN_STAKE_AMOUNT, 2 * SECONDS_PER_DAY, 3)];
    let mut coinstake = consensus.build_coinstake(&staked, STAKER, NOW, 10).unwrap();

    coinstake.outputs[0].value = consensus.stake_reward(10) + 1;
    let err = consensus
        .validate_coinstake(&coinstake, &staked, 10, NOW)
        .unwrap_err();
    assert!(matches!(err, ConsensusError::RewardExceeded(_)));
}

#[test]
fn test_validator_rejects_misaligned_stake_time() {
    let consensus = HybridConsensus::default();
    let staked = vec![output(MIN_STAKE_AMOUNT, 2 * SECONDS_PER_DAY, 3)];
    let coinstake = consensus
        .build_coinstake(&staked, STAKER, NOW + 1, 10)
        .unwrap();
    let err = consensus
        .validate_coinstake(&coinstake, &staked, 10, NOW)
        .unwrap_err();
    assert!(matches!(err, ConsensusError::InvalidTimestamp(_)));
}

#[test]
fn test_stake_stats_aggregates_snapshot_view() {
    let consensus = HybridConsensus::default();
    let snapshot = TestSnapshot {
        outputs: vec![
            output(MIN_STAKE_AMOUNT, SECONDS_PER_DAY, 1),
            output(MIN_STAKE_AMOUNT, 0, 2),            // too young
            output(MIN_STAKE_AMOUNT - 1, SECONDS_PER_DAY, 3), // too small
        ],
    };
    let stats = consensus.stake_stats(OWNER, &snapshot, NOW);
    assert_eq!(stats.total_inputs, 3);
    assert_eq!(stats.eligible_inputs, 1);
    assert_eq!(stats.total_stake_amount, MIN_STAKE_AMOUNT);
    assert_eq!(stats.total_stake_weight, MIN_STAKE_AMOUNT * 2);
}
