//! Per-algorithm difficulty adjustment (linear-weighted moving average)

use crate::constants::*;
use crate::types::Algorithm;

/// Solve times for the most recent blocks of a single algorithm's series.
///
/// Ordered oldest to newest. The algorithm is bound at construction so a
/// window can never mix solve times across series; stake blocks form their
/// own series under the stake spacing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolveTimeWindow {
    algo: Algorithm,
    solve_times: Vec<u32>,
}

impl SolveTimeWindow {
    pub fn new(algo: Algorithm, solve_times: Vec<u32>) -> Self {
        SolveTimeWindow { algo, solve_times }
    }

    pub fn algo(&self) -> Algorithm {
        self.algo
    }

    pub fn len(&self) -> usize {
        self.solve_times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solve_times.is_empty()
    }

    /// Append the newest solve time, discarding the oldest beyond the window.
    pub fn push(&mut self, solve_time: u32) {
        self.solve_times.push(solve_time);
        if self.solve_times.len() > LWMA_WINDOW {
            self.solve_times.remove(0);
        }
    }
}

/// Configured target spacing for one algorithm's series, in seconds.
pub fn target_spacing(algo: Algorithm) -> u32 {
    match algo {
        Algorithm::Pos => STAKE_TARGET_SPACING,
        _ => WORK_TARGET_SPACING,
    }
}

/// NextTarget: 𝔸 × ℕ × 𝕎 → ℕ
///
/// Compact target for the next block of the window's algorithm:
/// 1. Below the window size (chain too young) return the genesis floor.
/// 2. avg = Σ(solveTime_i · w_i) / Σw_i with w_i = i + 1 (newest heaviest)
/// 3. Scale the floor target by avg / spacing (slower blocks raise the target)
/// 4. Clamp to [floor/4, floor·4]
///
/// Total: every (window, height) pair has a defined answer. Scaling and
/// clamping act on the mantissa at the floor's exponent, where the compact
/// encoding is linear in the real target; the clamped mantissa is at most
/// four times the floor's and stays within the 24-bit field, so the emitted
/// word is always accepted by target expansion.
pub fn next_work_required(window: &SolveTimeWindow, height: u32) -> u32 {
    if (height as usize) < LWMA_WINDOW || window.len() < LWMA_WINDOW {
        return FLOOR_BITS;
    }

    let mut weighted_sum: u64 = 0;
    let mut weight_sum: u64 = 0;
    for (i, &solve_time) in window.solve_times.iter().enumerate() {
        let weight = (i + 1) as u64;
        weighted_sum += solve_time as u64 * weight;
        weight_sum += weight;
    }
    let avg_solve_time = weighted_sum / weight_sum;
    let spacing = target_spacing(window.algo) as u64;

    let floor_mantissa = (FLOOR_BITS & 0x00ff_ffff) as u64;
    let mut mantissa = floor_mantissa * avg_solve_time / spacing;

    // Bound oscillation to one clamp factor around the floor.
    let ceiling = floor_mantissa * TARGET_CLAMP_FACTOR;
    let lower = floor_mantissa / TARGET_CLAMP_FACTOR;
    if mantissa > ceiling {
        mantissa = ceiling;
    }
    if mantissa < lower {
        mantissa = lower;
    }

    (FLOOR_BITS & 0xff00_0000) | mantissa as u32
}
