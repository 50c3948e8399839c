//! Algorithm scheduling: height → production method

use crate::constants::*;
use crate::types::Algorithm;

/// SelectAlgo: ℕ → 𝔸
///
/// Deterministic, total mapping from block height to the production method.
/// Every `pos_interval`th block (genesis excepted) is stake-produced; the
/// remaining heights cycle the three work algorithms with period 3. The
/// rotation base resets after each stake slot, so the height immediately
/// following a stake block maps to sha256d again.
pub fn select_algo(height: u32, pos_interval: u32) -> Algorithm {
    if should_be_stake_block(height, pos_interval) {
        return Algorithm::Pos;
    }
    let phase = if height < pos_interval {
        height
    } else {
        height % pos_interval - 1
    };
    match phase % ALGO_COUNT {
        0 => Algorithm::Sha256d,
        1 => Algorithm::Scrypt,
        _ => Algorithm::Groestl,
    }
}

/// Whether the block at `height` must be stake-produced.
///
/// Genesis is always a work block even though 0 ≡ 0 (mod interval).
pub fn should_be_stake_block(height: u32, pos_interval: u32) -> bool {
    height > 0 && height % pos_interval == 0
}

/// AlgoName: 𝔸 → 𝕊
///
/// Total inverse lookup for diagnostics and serialization.
pub fn algo_name(algo: Algorithm) -> &'static str {
    match algo {
        Algorithm::Sha256d => "sha256d",
        Algorithm::Scrypt => "scrypt",
        Algorithm::Groestl => "groestl",
        Algorithm::Pos => "pos",
    }
}

/// Pack an algorithm into a hybrid-consensus version word.
///
/// The top bit marks the header as hybrid; bits 28-30 carry the algorithm.
/// Exact inverse of [`algo_from_version`] for every algorithm.
pub fn algo_to_version(algo: Algorithm) -> u32 {
    HYBRID_VERSION_MARKER | ((algo as u32) << 28)
}

/// Recover the algorithm from a version word, if it carries the hybrid marker.
///
/// Total over marked versions: bits 28-30 only ever hold values 0-3 written by
/// [`algo_to_version`]; values 4-7 are unreachable through the packer and map
/// to `None` so a forged version fails closed.
pub fn algo_from_version(version: u32) -> Option<Algorithm> {
    if version & HYBRID_VERSION_MARKER == 0 {
        return None;
    }
    match (version >> 28) & 0x07 {
        0 => Some(Algorithm::Sha256d),
        1 => Some(Algorithm::Scrypt),
        2 => Some(Algorithm::Groestl),
        3 => Some(Algorithm::Pos),
        _ => None,
    }
}
