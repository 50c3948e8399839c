//! Block header wire codec
//!
//! Fixed little-endian layout: version (4), previous hash (32), merkle root
//! (32), time (4), bits (4), nonce (4), algorithm tag (1), block type (1),
//! then — only when the block type is stake — stake transaction hash (32),
//! stake time (4) and stake kernel hash (32).

use crate::algo::algo_from_version;
use crate::constants::HYBRID_VERSION_MARKER;
use crate::error::{ConsensusError, Result};
use crate::types::{Algorithm, BlockHeader, BlockType, Hash};
use sha2::{Digest, Sha256};

/// Serialized size of a work header
pub const WORK_HEADER_SIZE: usize = 82;

/// Serialized size of a stake header (work layout plus the stake trailer)
pub const STAKE_HEADER_SIZE: usize = WORK_HEADER_SIZE + 32 + 4 + 32;

/// Serialize a header to its wire layout.
pub fn serialize_header(header: &BlockHeader) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(STAKE_HEADER_SIZE);

    bytes.extend_from_slice(&header.version.to_le_bytes());
    bytes.extend_from_slice(&header.prev_block_hash);
    bytes.extend_from_slice(&header.merkle_root);
    bytes.extend_from_slice(&header.timestamp.to_le_bytes());
    bytes.extend_from_slice(&header.bits.to_le_bytes());
    bytes.extend_from_slice(&header.nonce.to_le_bytes());
    bytes.push(header.algorithm as u8);
    bytes.push(header.block_type as u8);

    if header.block_type == BlockType::Stake {
        bytes.extend_from_slice(&header.stake_tx_hash);
        bytes.extend_from_slice(&header.stake_time.to_le_bytes());
        bytes.extend_from_slice(&header.stake_kernel_hash);
    }

    bytes
}

/// Deserialize a header, failing closed on any inconsistency.
///
/// Checks, in order: buffer length for the tagged block type, a known
/// algorithm tag, agreement between the explicit tag and the version-bit
/// encoding (for hybrid-marked versions), and the Stake ⇔ Pos coupling
/// between the block-type and algorithm tags.
pub fn deserialize_header(bytes: &[u8]) -> Result<BlockHeader> {
    if bytes.len() < WORK_HEADER_SIZE {
        return Err(ConsensusError::Serialization(format!(
            "header too short: {} bytes",
            bytes.len()
        )));
    }

    let version = read_u32(bytes, 0);
    let prev_block_hash = read_hash(bytes, 4);
    let merkle_root = read_hash(bytes, 36);
    let timestamp = read_u32(bytes, 68);
    let bits = read_u32(bytes, 72);
    let nonce = read_u32(bytes, 76);
    let algo_tag = bytes[80];
    let type_tag = bytes[81];

    let algorithm = match algo_tag {
        0 => Algorithm::Sha256d,
        1 => Algorithm::Scrypt,
        2 => Algorithm::Groestl,
        3 => Algorithm::Pos,
        other => {
            return Err(ConsensusError::Serialization(format!(
                "unknown algorithm tag {other}"
            )))
        }
    };
    let block_type = match type_tag {
        0 => BlockType::Work,
        1 => BlockType::Stake,
        other => {
            return Err(ConsensusError::Serialization(format!(
                "unknown block type tag {other}"
            )))
        }
    };

    // The version-bit encoding is redundant; when present it must agree with
    // the explicit tag.
    if version & HYBRID_VERSION_MARKER != 0 {
        match algo_from_version(version) {
            Some(version_algo) if version_algo == algorithm => {}
            _ => {
                return Err(ConsensusError::Serialization(format!(
                    "version bits disagree with algorithm tag {}",
                    crate::algo::algo_name(algorithm)
                )))
            }
        }
    }

    if (algorithm == Algorithm::Pos) != (block_type == BlockType::Stake) {
        return Err(ConsensusError::Serialization(
            "block type and algorithm tags are inconsistent".to_string(),
        ));
    }

    let expected_len = if block_type == BlockType::Stake {
        STAKE_HEADER_SIZE
    } else {
        WORK_HEADER_SIZE
    };
    if bytes.len() != expected_len {
        return Err(ConsensusError::Serialization(format!(
            "{} bytes for a header that needs {expected_len}",
            bytes.len()
        )));
    }

    let (stake_tx_hash, stake_time, stake_kernel_hash) = if block_type == BlockType::Stake {
        (
            read_hash(bytes, 82),
            read_u32(bytes, 114),
            read_hash(bytes, 118),
        )
    } else {
        ([0u8; 32], 0, [0u8; 32])
    };

    Ok(BlockHeader {
        version,
        prev_block_hash,
        merkle_root,
        timestamp,
        bits,
        nonce,
        algorithm,
        block_type,
        stake_tx_hash,
        stake_time,
        stake_kernel_hash,
    })
}

/// Block hash: double SHA-256 of the serialized header.
pub fn header_hash(header: &BlockHeader) -> Hash {
    let bytes = serialize_header(header);
    let first = Sha256::digest(&bytes);
    let second = Sha256::digest(first);
    let mut out = [0u8; 32];
    out.copy_from_slice(&second);
    out
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn read_hash(bytes: &[u8], offset: usize) -> Hash {
    let mut buf = [0u8; 32];
    buf.copy_from_slice(&bytes[offset..offset + 32]);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_work_header() -> BlockHeader {
        let mut header = BlockHeader {
            version: 0,
            prev_block_hash: [1; 32],
            merkle_root: [2; 32],
            timestamp: 1_700_000_000,
            bits: 0x1d00ffff,
            nonce: 0x12345678,
            algorithm: Algorithm::Scrypt,
            block_type: BlockType::Work,
            stake_tx_hash: [0; 32],
            stake_time: 0,
            stake_kernel_hash: [0; 32],
        };
        header.set_algorithm(Algorithm::Scrypt);
        header
    }

    fn sample_stake_header() -> BlockHeader {
        let mut header = sample_work_header();
        header.set_algorithm(Algorithm::Pos);
        header.stake_tx_hash = [3; 32];
        header.stake_time = 1_700_000_100;
        header.stake_kernel_hash = [4; 32];
        header
    }

    #[test]
    fn test_work_header_round_trip() {
        let header = sample_work_header();
        let bytes = serialize_header(&header);
        assert_eq!(bytes.len(), WORK_HEADER_SIZE);
        assert_eq!(deserialize_header(&bytes).unwrap(), header);
    }

    #[test]
    fn test_stake_header_round_trip() {
        let header = sample_stake_header();
        let bytes = serialize_header(&header);
        assert_eq!(bytes.len(), STAKE_HEADER_SIZE);
        assert_eq!(deserialize_header(&bytes).unwrap(), header);
    }

    #[test]
    fn test_deserialize_rejects_truncated_header() {
        let bytes = serialize_header(&sample_work_header());
        assert!(deserialize_header(&bytes[..WORK_HEADER_SIZE - 1]).is_err());
    }

    #[test]
    fn test_deserialize_rejects_truncated_stake_trailer() {
        let bytes = serialize_header(&sample_stake_header());
        assert!(deserialize_header(&bytes[..STAKE_HEADER_SIZE - 1]).is_err());
    }

    #[test]
    fn test_deserialize_rejects_trailing_bytes() {
        let mut bytes = serialize_header(&sample_work_header());
        bytes.push(0);
        assert!(deserialize_header(&bytes).is_err());
    }

    #[test]
    fn test_deserialize_rejects_unknown_tags() {
        let mut bytes = serialize_header(&sample_work_header());
        bytes[80] = 9;
        assert!(deserialize_header(&bytes).is_err());

        let mut bytes = serialize_header(&sample_work_header());
        bytes[81] = 9;
        assert!(deserialize_header(&bytes).is_err());
    }

    #[test]
    fn test_deserialize_rejects_version_bit_disagreement() {
        let mut header = sample_work_header();
        // Tag says scrypt, version bits say groestl.
        header.version = crate::algo::algo_to_version(Algorithm::Groestl);
        let bytes = serialize_header(&header);
        assert!(deserialize_header(&bytes).is_err());
    }

    #[test]
    fn test_deserialize_accepts_unmarked_legacy_version() {
        let mut header = sample_work_header();
        header.version = 1;
        let bytes = serialize_header(&header);
        assert_eq!(deserialize_header(&bytes).unwrap(), header);
    }

    #[test]
    fn test_deserialize_rejects_stake_type_with_work_algo() {
        let mut header = sample_stake_header();
        header.algorithm = Algorithm::Sha256d;
        header.version = crate::algo::algo_to_version(Algorithm::Sha256d);
        let bytes = serialize_header(&header);
        assert!(deserialize_header(&bytes).is_err());
    }

    #[test]
    fn test_deserialize_rejects_pos_algo_with_work_type() {
        let mut header = sample_work_header();
        header.algorithm = Algorithm::Pos;
        header.version = crate::algo::algo_to_version(Algorithm::Pos);
        let bytes = serialize_header(&header);
        assert!(deserialize_header(&bytes).is_err());
    }

    #[test]
    fn test_header_hash_commits_to_stake_trailer() {
        let header = sample_stake_header();
        let mut tweaked = header.clone();
        tweaked.stake_kernel_hash = [5; 32];
        assert_ne!(header_hash(&header), header_hash(&tweaked));
    }
}
