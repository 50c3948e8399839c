//! Chained stake modifier and its memoization cache

use crate::error::{ConsensusError, Result};
use crate::types::{ChainView, Hash};
use std::collections::HashMap;
use std::sync::Mutex;

/// Combine an ancestor modifier with a block hash.
///
/// Byte-wise multiply-xor fold over the whole hash; deterministic across
/// nodes. Genesis carries modifier 0.
pub fn compute_stake_modifier(prev_modifier: u64, block_hash: &Hash) -> u64 {
    let mut acc = prev_modifier;
    for &byte in block_hash.iter() {
        acc = acc.wrapping_mul(131) ^ byte as u64;
    }
    acc
}

/// Memoization cache for the modifier chain.
///
/// The modifier of a block is a pure function of its ancestor hashes; the
/// cache only saves the ancestor walk. Production and validation threads
/// share it, so the map sits behind a mutex. Entries for disconnected blocks
/// must be evicted before the alternate branch is validated.
#[derive(Debug, Default)]
pub struct ModifierCache {
    entries: Mutex<HashMap<Hash, u64>>,
}

impl ModifierCache {
    pub fn new() -> Self {
        ModifierCache {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Modifier: ℍ → ℕ
    ///
    /// Modifier for the block with the given hash. Walks ancestors back to
    /// the nearest cached entry (or genesis), then folds forward, caching
    /// every block on the way. The genesis block is recognized by an all-zero
    /// parent hash and carries modifier 0.
    ///
    /// An unknown starting hash is a recoverable [`ConsensusError::StaleModifier`];
    /// a missing interior ancestor means the chain-state provider broke its
    /// contract and surfaces as [`ConsensusError::MissingBlockIndex`].
    pub fn modifier(&self, chain: &dyn ChainView, block_hash: &Hash) -> Result<u64> {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(&cached) = entries.get(block_hash) {
            return Ok(cached);
        }

        let start = chain.block_index(block_hash).ok_or_else(|| {
            ConsensusError::StaleModifier(format!("block {}", hex_prefix(block_hash)))
        })?;

        // Ancestors pending computation, newest first.
        let mut pending = vec![start.hash];
        let mut base_modifier = 0u64;
        let mut cursor = start.prev_hash;
        while cursor != [0u8; 32] {
            if let Some(&cached) = entries.get(&cursor) {
                base_modifier = cached;
                break;
            }
            let index = chain.block_index(&cursor).ok_or_else(|| {
                ConsensusError::MissingBlockIndex(format!("ancestor {}", hex_prefix(&cursor)))
            })?;
            pending.push(index.hash);
            cursor = index.prev_hash;
        }

        let mut modifier = base_modifier;
        for hash in pending.into_iter().rev() {
            modifier = compute_stake_modifier(modifier, &hash);
            entries.insert(hash, modifier);
        }

        log::trace!(
            "stake modifier for {}: {:#018x}",
            hex_prefix(block_hash),
            modifier
        );
        Ok(modifier)
    }

    /// Invalidate: ℍ → ()
    ///
    /// Evict a disconnected block's entry. The reorg handler calls this for
    /// every disconnected block before any block on the alternate branch is
    /// validated.
    pub fn invalidate(&self, block_hash: &Hash) {
        let mut entries = self
            .entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if entries.remove(block_hash).is_some() {
            log::debug!("invalidated stake modifier for {}", hex_prefix(block_hash));
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

fn hex_prefix(hash: &Hash) -> String {
    hash[..4].iter().map(|b| format!("{b:02x}")).collect()
}
