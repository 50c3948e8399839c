//! Error types for hybrid consensus validation

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsensusError {
    #[error("Invalid stake timestamp: {0}")]
    InvalidTimestamp(String),

    #[error("Invalid coinstake structure: {0}")]
    InvalidCoinstakeStructure(String),

    #[error("Coinstake output exceeds input plus reward: {0}")]
    RewardExceeded(String),

    #[error("Stake modifier requested for unknown or invalidated block: {0}")]
    StaleModifier(String),

    #[error("Chain state is missing a required block index: {0}")]
    MissingBlockIndex(String),

    #[error("Invalid proof of work: {0}")]
    InvalidProofOfWork(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type Result<T> = std::result::Result<T, ConsensusError>;
