//! Proof-of-work hashing dispatch and target comparison

use crate::error::{ConsensusError, Result};
use crate::types::{Algorithm, BlockHeader, Hash};
use groestl::Groestl256;
use sha2::{Digest, Sha256};

/// Hash: 𝕊* × 𝔸 → ℍ
///
/// Dispatch serialized header bytes to the hash primitive for `algo`. The
/// algorithm set is closed, so this is a plain match; the primitives
/// themselves are opaque. `Pos` has no work hash — stake blocks are
/// authorized through the kernel check — so it is rejected here.
pub fn pow_hash(header_bytes: &[u8], algo: Algorithm) -> Result<Hash> {
    match algo {
        Algorithm::Sha256d => Ok(sha256d(header_bytes)),
        Algorithm::Scrypt => scrypt_hash(header_bytes),
        Algorithm::Groestl => Ok(groestl_hash(header_bytes)),
        Algorithm::Pos => Err(ConsensusError::InvalidProofOfWork(
            "stake blocks have no work hash".to_string(),
        )),
    }
}

/// CheckProofOfWork: ℋ → {true, false}
///
/// Serialize the header, hash it under the header's own algorithm tag and
/// compare the digest (little-endian 256-bit) against the expanded compact
/// target.
pub fn check_proof_of_work(header: &BlockHeader) -> Result<bool> {
    let header_bytes = crate::block::serialize_header(header);
    let digest = pow_hash(&header_bytes, header.algorithm)?;
    let hash_value = U256::from_bytes(&digest);
    let target = expand_target(header.bits)?;
    Ok(hash_value < target)
}

fn sha256d(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

/// Header-hash scrypt: N=1024, r=1, p=1, header as both password and salt.
fn scrypt_hash(data: &[u8]) -> Result<Hash> {
    let params = scrypt::Params::new(10, 1, 1, 32)
        .map_err(|e| ConsensusError::InvalidProofOfWork(format!("scrypt params: {e}")))?;
    let mut out = [0u8; 32];
    scrypt::scrypt(data, data, &params, &mut out)
        .map_err(|e| ConsensusError::InvalidProofOfWork(format!("scrypt: {e}")))?;
    Ok(out)
}

fn groestl_hash(data: &[u8]) -> Hash {
    let digest = Groestl256::digest(data);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// 256-bit integer for target calculations
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct U256([u64; 4]);

impl U256 {
    pub(crate) fn zero() -> Self {
        U256([0; 4])
    }

    pub(crate) fn is_zero(&self) -> bool {
        self.0.iter().all(|&x| x == 0)
    }

    fn from_u32(value: u32) -> Self {
        U256([value as u64, 0, 0, 0])
    }

    fn shl(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::zero();
        }
        let mut result = U256::zero();
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        for i in 0..4 {
            if i + word_shift < 4 {
                result.0[i + word_shift] |= self.0[i] << bit_shift;
                if bit_shift > 0 && i + word_shift + 1 < 4 {
                    result.0[i + word_shift + 1] |= self.0[i] >> (64 - bit_shift);
                }
            }
        }
        result
    }

    fn shr(&self, shift: u32) -> Self {
        if shift >= 256 {
            return U256::zero();
        }
        let mut result = U256::zero();
        let word_shift = (shift / 64) as usize;
        let bit_shift = shift % 64;
        for i in 0..4 {
            if i >= word_shift {
                result.0[i - word_shift] |= self.0[i] >> bit_shift;
                if bit_shift > 0 && i - word_shift > 0 {
                    result.0[i - word_shift - 1] |= self.0[i] << (64 - bit_shift);
                }
            }
        }
        result
    }

    pub(crate) fn from_bytes(bytes: &Hash) -> Self {
        let mut words = [0u64; 4];
        for (i, word) in words.iter_mut().enumerate() {
            let start = i * 8;
            let mut buf = [0u8; 8];
            buf.copy_from_slice(&bytes[start..start + 8]);
            *word = u64::from_le_bytes(buf);
        }
        U256(words)
    }
}

impl PartialOrd for U256 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for U256 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        for (a, b) in self.0.iter().rev().zip(other.0.iter().rev()) {
            match a.cmp(b) {
                std::cmp::Ordering::Equal => continue,
                order => return order,
            }
        }
        std::cmp::Ordering::Equal
    }
}

/// Expand a compact target: mantissa · 2^(8·(exponent − 3))
///
/// Compact form 0xEEMMMMMM with exponent EE and mantissa MMMMMM. Exponents
/// below 3 shift right; exponents above 29 are rejected as out of range.
pub(crate) fn expand_target(bits: u32) -> Result<U256> {
    let exponent = (bits >> 24) as u8;
    let mantissa = bits & 0x00ff_ffff;

    if exponent < 3 {
        return Err(ConsensusError::InvalidProofOfWork(
            "target exponent too small".to_string(),
        ));
    }
    if exponent > 29 {
        return Err(ConsensusError::InvalidProofOfWork(
            "target too large".to_string(),
        ));
    }
    if mantissa == 0 {
        return Ok(U256::zero());
    }

    let mantissa = U256::from_u32(mantissa);
    if exponent <= 3 {
        Ok(mantissa.shr(8 * (3 - exponent) as u32))
    } else {
        Ok(mantissa.shl(8 * (exponent - 3) as u32))
    }
}
