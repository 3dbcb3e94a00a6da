use crate::blockchain::core::chain::{Block, GENESIS_PREVIOUS_HASH};
use crate::error::ChainError;
use std::sync::Arc;

fn validate_hash(block: &Block) -> Result<(), ChainError> {
    let calculated = block.calculate_hash()?;
    if calculated != block.hash {
        return Err(ChainError::HashMismatch {
            expected: calculated,
            found: block.hash.clone(),
        });
    }
    Ok(())
}

/// Checks a candidate against the current tail: link first, then the
/// candidate's own hash, then its position.
pub fn validate_candidate(
    tail: &Block,
    expected_index: u64,
    candidate: &Block,
) -> Result<(), ChainError> {
    if candidate.previous_hash != tail.hash {
        return Err(ChainError::PreviousHashMismatch {
            expected: tail.hash.clone(),
            found: candidate.previous_hash.clone(),
        });
    }

    validate_hash(candidate)?;

    if candidate.index != expected_index {
        return Err(ChainError::IndexMismatch {
            expected: expected_index,
            found: candidate.index,
        });
    }
    Ok(())
}

pub fn validate_genesis(block: &Block) -> Result<(), ChainError> {
    if block.index != 0 {
        return Err(ChainError::IndexMismatch {
            expected: 0,
            found: block.index,
        });
    }
    if block.previous_hash != GENESIS_PREVIOUS_HASH {
        return Err(ChainError::PreviousHashMismatch {
            expected: GENESIS_PREVIOUS_HASH.to_string(),
            found: block.previous_hash.clone(),
        });
    }
    validate_hash(block)
}

pub fn validate_chain(blocks: &[Arc<Block>]) -> Result<(), ChainError> {
    let (genesis, rest) = blocks.split_first().ok_or(ChainError::EmptyChain)?;
    validate_genesis(genesis)?;

    let mut tail = genesis;
    for (offset, block) in rest.iter().enumerate() {
        validate_candidate(tail, offset as u64 + 1, block)?;
        tail = block;
    }
    Ok(())
}
