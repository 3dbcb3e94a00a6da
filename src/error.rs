//! Error types for LightChain

use crate::crypto::KeyAlgorithm;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    PreviousHashMismatch { expected: String, found: String },
    HashMismatch { expected: String, found: String },
    IndexMismatch { expected: u64, found: u64 },
    EmptyChain,
    HashComputation(String),
    KeyGenerationFailure(String),
    InvalidKeyType { expected: KeyAlgorithm, found: KeyAlgorithm },
    SignFailure(String),
    InvalidKey(String),
    ConfigError(String),
    IoError(String),
}

impl ChainError {
    /// True for the chain-integrity errors a caller recovers from by
    /// discarding the candidate and building a fresh one.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            ChainError::PreviousHashMismatch { .. }
                | ChainError::HashMismatch { .. }
                | ChainError::IndexMismatch { .. }
        )
    }
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChainError::PreviousHashMismatch { expected, found } => write!(
                f,
                "Invalid block: previous hash does not match (expected {}, found {})",
                expected, found
            ),
            ChainError::HashMismatch { expected, found } => write!(
                f,
                "Invalid block: hash mismatch (expected {}, found {})",
                expected, found
            ),
            ChainError::IndexMismatch { expected, found } => write!(
                f,
                "Invalid block: index mismatch (expected {}, found {})",
                expected, found
            ),
            ChainError::EmptyChain => write!(f, "Chain has no genesis block"),
            ChainError::HashComputation(msg) => write!(f, "Hash computation failed: {}", msg),
            ChainError::KeyGenerationFailure(msg) => write!(f, "Key generation failed: {}", msg),
            ChainError::InvalidKeyType { expected, found } => write!(
                f,
                "Invalid key type: expected {} key, got {} key",
                expected, found
            ),
            ChainError::SignFailure(msg) => write!(f, "Signing failed: {}", msg),
            ChainError::InvalidKey(msg) => write!(f, "Invalid key material: {}", msg),
            ChainError::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
            ChainError::IoError(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<std::io::Error> for ChainError {
    fn from(err: std::io::Error) -> Self {
        ChainError::IoError(err.to_string())
    }
}

impl From<toml::de::Error> for ChainError {
    fn from(err: toml::de::Error) -> Self {
        ChainError::ConfigError(err.to_string())
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integrity_violations_are_classified() {
        let mismatch = ChainError::PreviousHashMismatch {
            expected: "aa".to_string(),
            found: "deadbeef".to_string(),
        };
        assert!(mismatch.is_integrity_violation());
        assert!(!ChainError::SignFailure("boom".to_string()).is_integrity_violation());
    }

    #[test]
    fn display_includes_both_digests() {
        let err = ChainError::HashMismatch {
            expected: "abc".to_string(),
            found: "def".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid block: hash mismatch (expected abc, found def)"
        );
    }
}
