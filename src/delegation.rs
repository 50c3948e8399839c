//! Cold-staking delegation registry

use crate::types::ByteString;
use std::collections::HashMap;
use std::sync::Mutex;

/// Owner script → staker script map for cold staking.
///
/// The owner's coins stay selectable as stake inputs while the kernel search
/// and block assembly run under the staker's script; spending authority never
/// moves (enforced by the transaction-validation layer, not here). At most
/// one delegation per owner, last write wins. Shared between production and
/// validation threads, so the map sits behind a mutex.
#[derive(Debug, Default)]
pub struct DelegationRegistry {
    delegations: Mutex<HashMap<ByteString, ByteString>>,
}

impl DelegationRegistry {
    pub fn new() -> Self {
        DelegationRegistry {
            delegations: Mutex::new(HashMap::new()),
        }
    }

    /// Delegate staking for `owner_script` to `staker_script`, replacing any
    /// existing delegation.
    pub fn delegate(&self, owner_script: &[u8], staker_script: &[u8]) {
        let mut delegations = self
            .delegations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        delegations.insert(owner_script.to_vec(), staker_script.to_vec());
        log::debug!("delegated staking for {} byte owner script", owner_script.len());
    }

    /// Remove the owner's delegation. Returns whether one existed.
    pub fn revoke(&self, owner_script: &[u8]) -> bool {
        let mut delegations = self
            .delegations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        delegations.remove(owner_script).is_some()
    }

    /// StakerFor: 𝕊 → Option<𝕊>
    ///
    /// The delegated staker script, or `None` for an undelegated owner (not
    /// an error).
    pub fn staker_for(&self, owner_script: &[u8]) -> Option<ByteString> {
        let delegations = self
            .delegations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        delegations.get(owner_script).cloned()
    }
}
