//! Block digest.
//!
//! SHA-256 over a bincode encoding of the block fields. Bincode prefixes
//! every string and sequence with its length, so field boundaries are
//! unambiguous and every transaction is covered in order.

use crate::blockchain::Transaction;
use crate::error::{ChainError, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 digest.
pub type BlockHash = String;

#[derive(Serialize)]
struct CanonicalBlock<'a> {
    index: u64,
    previous_hash: &'a str,
    timestamp: &'a DateTime<Utc>,
    transactions: &'a [Transaction],
    nonce: u64,
}

pub fn hash_block_fields(
    index: u64,
    previous_hash: &str,
    timestamp: &DateTime<Utc>,
    transactions: &[Transaction],
    nonce: u64,
) -> Result<BlockHash> {
    let canonical = CanonicalBlock {
        index,
        previous_hash,
        timestamp,
        transactions,
        nonce,
    };
    let encoded = bincode::serialize(&canonical)
        .map_err(|e| ChainError::HashComputation(e.to_string()))?;
    Ok(hex::encode(Sha256::digest(&encoded)))
}
