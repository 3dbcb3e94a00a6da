use crate::blockchain::core::validation::{validate_candidate, validate_chain};
use crate::config::LedgerConfig;
use crate::crypto::{PrivateKey, PublicKey, Signature, SigningService};
use crate::error::Result;
use crate::hashing::{hash_block_fields, BlockHash};
use crate::rng::RandomnessService;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sentinel predecessor link of the genesis block.
pub const GENESIS_PREVIOUS_HASH: &str = "0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub data: String,
    pub timestamp: DateTime<Utc>,
}

impl Transaction {
    pub fn new(data: impl Into<String>) -> Self {
        Transaction {
            data: data.into(),
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub index: u64,
    pub previous_hash: BlockHash,
    pub timestamp: DateTime<Utc>,
    pub transactions: Vec<Transaction>,
    pub hash: BlockHash,
    pub nonce: u64,
}

impl Block {
    /// Builds a detached block stamped with the current time and sealed
    /// with its own hash.
    pub fn new(
        index: u64,
        previous_hash: BlockHash,
        transactions: Vec<Transaction>,
        nonce: u64,
    ) -> Result<Self> {
        let mut block = Block {
            index,
            previous_hash,
            timestamp: Utc::now(),
            transactions,
            hash: BlockHash::new(),
            nonce,
        };
        block.hash = block.calculate_hash()?;
        Ok(block)
    }

    pub fn calculate_hash(&self) -> Result<BlockHash> {
        hash_block_fields(
            self.index,
            &self.previous_hash,
            &self.timestamp,
            &self.transactions,
            self.nonce,
        )
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0 && self.previous_hash == GENESIS_PREVIOUS_HASH
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Block {}:", self.index)?;
        writeln!(f, "  PreviousHash: {}", self.previous_hash)?;
        writeln!(f, "  Hash:         {}", self.hash)?;
        writeln!(f, "  Timestamp:    {}", self.timestamp.to_rfc3339())?;
        writeln!(f, "  Nonce:        {}", self.nonce)?;
        write!(f, "  Transactions: {}", self.transactions.len())?;
        for tx in &self.transactions {
            write!(f, "\n    - [{}] {}", tx.timestamp.to_rfc3339(), tx.data)?;
        }
        Ok(())
    }
}

/// Append-only chain of blocks.
///
/// The chain always holds at least the genesis block. Appended blocks are
/// kept behind `Arc` and never handed out mutably, so callers may hold on to
/// them after later appends.
pub struct Ledger {
    blocks: Vec<Arc<Block>>,
    signing_service: Arc<dyn SigningService>,
    randomness: Arc<dyn RandomnessService>,
    nonce_bound: u64,
}

impl Ledger {
    /// Create a ledger with the default genesis payload and nonce bound.
    pub fn new(
        signing_service: Arc<dyn SigningService>,
        randomness: Arc<dyn RandomnessService>,
    ) -> Result<Self> {
        Self::with_config(signing_service, randomness, &LedgerConfig::default())
    }

    pub fn with_config(
        signing_service: Arc<dyn SigningService>,
        randomness: Arc<dyn RandomnessService>,
        config: &LedgerConfig,
    ) -> Result<Self> {
        let genesis_block = Self::create_genesis_block(&config.genesis_data)?;
        info!(hash = %genesis_block.hash, "initialized ledger with genesis block");

        Ok(Ledger {
            blocks: vec![Arc::new(genesis_block)],
            signing_service,
            randomness,
            nonce_bound: config.nonce_bound,
        })
    }

    fn create_genesis_block(genesis_data: &str) -> Result<Block> {
        Block::new(
            0,
            GENESIS_PREVIOUS_HASH.to_string(),
            vec![Transaction::new(genesis_data)],
            0,
        )
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false: the genesis block is never removed.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }

    pub fn genesis(&self) -> &Arc<Block> {
        &self.blocks[0]
    }

    pub fn last_block(&self) -> &Arc<Block> {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn get_block(&self, index: u64) -> Option<&Arc<Block>> {
        usize::try_from(index).ok().and_then(|i| self.blocks.get(i))
    }

    pub fn nonce_bound(&self) -> u64 {
        self.nonce_bound
    }

    pub fn signing_service(&self) -> &Arc<dyn SigningService> {
        &self.signing_service
    }

    /// Builds a candidate on top of the current tail. The chain is not
    /// touched; the candidate must go through [`Ledger::add_block`].
    pub fn create_block(&self, data: impl Into<String>) -> Result<Block> {
        let last_block = self.last_block();
        let nonce = self.randomness.next_below(self.nonce_bound);

        let candidate = Block::new(
            self.blocks.len() as u64,
            last_block.hash.clone(),
            vec![Transaction::new(data)],
            nonce,
        )?;
        debug!(index = candidate.index, nonce, hash = %candidate.hash, "created candidate block");
        Ok(candidate)
    }

    /// Validates `candidate` against the tail and appends it. On error the
    /// chain is unchanged.
    pub fn add_block(&mut self, candidate: Block) -> Result<()> {
        let expected_index = self.blocks.len() as u64;
        if let Err(e) = validate_candidate(self.last_block(), expected_index, &candidate) {
            warn!(index = candidate.index, error = %e, "rejected candidate block");
            return Err(e);
        }

        info!(index = candidate.index, hash = %candidate.hash, "appended block");
        self.blocks.push(Arc::new(candidate));
        Ok(())
    }

    /// Create and append in one step, returning the appended block.
    pub fn append(&mut self, data: impl Into<String>) -> Result<Arc<Block>> {
        let candidate = self.create_block(data)?;
        self.add_block(candidate)?;
        Ok(Arc::clone(self.last_block()))
    }

    /// Re-checks every link and hash from genesis to tail.
    pub fn validate_chain(&self) -> Result<()> {
        validate_chain(&self.blocks)
    }

    /// Signs the block hash with the ledger's signing service.
    pub fn attest_block(&self, block: &Block, private_key: &PrivateKey) -> Result<Signature> {
        self.signing_service.sign(block.hash.as_bytes(), private_key)
    }

    pub fn verify_attestation(
        &self,
        block: &Block,
        signature: &Signature,
        public_key: &PublicKey,
    ) -> bool {
        self.signing_service
            .verify(block.hash.as_bytes(), signature, public_key)
    }
}

impl fmt::Debug for Ledger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Ledger")
            .field("len", &self.blocks.len())
            .field("tip", &self.last_block().hash)
            .field("algorithm", &self.signing_service.algorithm())
            .field("nonce_bound", &self.nonce_bound)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{EcdsaSigner, Ed25519Signer};
    use crate::error::ChainError;
    use crate::rng::SeededRandomness;

    fn test_ledger() -> Ledger {
        Ledger::new(Arc::new(EcdsaSigner::new()), Arc::new(SeededRandomness::new(1))).unwrap()
    }

    #[test]
    fn test_genesis_block() {
        let ledger = test_ledger();
        assert_eq!(ledger.len(), 1);

        let genesis = ledger.genesis();
        assert_eq!(genesis.index, 0);
        assert_eq!(genesis.previous_hash, GENESIS_PREVIOUS_HASH);
        assert_eq!(genesis.nonce, 0);
        assert_eq!(genesis.transactions.len(), 1);
        assert_eq!(genesis.transactions[0].data, "Genesis Block");
        assert_eq!(genesis.hash, genesis.calculate_hash().unwrap());
        assert!(genesis.is_genesis());
    }

    #[test]
    fn test_custom_genesis_data() {
        let config = LedgerConfig {
            nonce_bound: 10,
            genesis_data: "hello".to_string(),
        };
        let ledger = Ledger::with_config(
            Arc::new(EcdsaSigner::new()),
            Arc::new(SeededRandomness::new(1)),
            &config,
        )
        .unwrap();
        assert_eq!(ledger.genesis().transactions[0].data, "hello");
        assert_eq!(ledger.nonce_bound(), 10);
        assert!(ledger.create_block("x").unwrap().nonce < 10);
    }

    #[test]
    fn test_create_block_does_not_mutate_chain() {
        let ledger = test_ledger();
        let candidate = ledger.create_block("tx1").unwrap();

        assert_eq!(ledger.len(), 1);
        assert_eq!(candidate.index, 1);
        assert_eq!(candidate.previous_hash, ledger.genesis().hash);
        assert_eq!(candidate.transactions.len(), 1);
        assert_eq!(candidate.transactions[0].data, "tx1");
        assert!(candidate.nonce < 1_000_000_000);
        assert_eq!(candidate.hash, candidate.calculate_hash().unwrap());
    }

    #[test]
    fn test_add_block() {
        let mut ledger = test_ledger();
        let candidate = ledger.create_block("tx1").unwrap();
        ledger.add_block(candidate.clone()).unwrap();

        assert_eq!(ledger.len(), 2);
        assert_eq!(**ledger.last_block(), candidate);
        assert_eq!(ledger.get_block(1).map(|b| b.index), Some(1));
        assert!(ledger.get_block(2).is_none());
    }

    #[test]
    fn test_tampered_previous_hash_is_rejected() {
        let mut ledger = test_ledger();
        let mut forged = ledger.create_block("tx1").unwrap();
        forged.previous_hash = "deadbeef".to_string();
        forged.hash = forged.calculate_hash().unwrap();

        let err = ledger.add_block(forged).unwrap_err();
        assert!(matches!(err, ChainError::PreviousHashMismatch { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_tampered_hash_is_rejected() {
        let mut ledger = test_ledger();
        let mut forged = ledger.create_block("tx1").unwrap();
        forged.hash = "00".repeat(32);

        let err = ledger.add_block(forged).unwrap_err();
        assert!(matches!(err, ChainError::HashMismatch { .. }));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let mut ledger = test_ledger();
        let mut forged = ledger.create_block("pay alice 1").unwrap();
        forged.transactions[0].data = "pay alice 100".to_string();

        let err = ledger.add_block(forged).unwrap_err();
        assert!(matches!(err, ChainError::HashMismatch { .. }));
    }

    #[test]
    fn test_previous_hash_checked_before_hash() {
        let mut ledger = test_ledger();
        let mut forged = ledger.create_block("tx1").unwrap();
        forged.previous_hash = "deadbeef".to_string();

        // Both checks fail; the link check wins.
        let err = ledger.add_block(forged).unwrap_err();
        assert!(matches!(err, ChainError::PreviousHashMismatch { .. }));
    }

    #[test]
    fn test_wrong_index_is_rejected() {
        let mut ledger = test_ledger();
        let tail_hash = ledger.last_block().hash.clone();
        let forged = Block::new(5, tail_hash, vec![Transaction::new("skip")], 0).unwrap();

        let err = ledger.add_block(forged).unwrap_err();
        assert_eq!(err, ChainError::IndexMismatch { expected: 1, found: 5 });
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_stale_candidate_is_rejected() {
        let mut ledger = test_ledger();
        let first = ledger.create_block("a").unwrap();
        let stale = ledger.create_block("b").unwrap();

        ledger.add_block(first).unwrap();
        let err = ledger.add_block(stale).unwrap_err();
        assert!(err.is_integrity_violation());
        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn test_append_and_validate_chain() {
        let mut ledger = test_ledger();
        for i in 0..10 {
            let block = ledger.append(format!("tx{}", i)).unwrap();
            assert_eq!(block.index, i + 1);
        }
        assert_eq!(ledger.len(), 11);
        ledger.validate_chain().unwrap();

        for (i, pair) in ledger.blocks().windows(2).enumerate() {
            assert_eq!(pair[1].index, i as u64 + 1);
            assert_eq!(pair[1].previous_hash, pair[0].hash);
        }
    }

    #[test]
    fn test_block_attestation() {
        for signer in [
            Arc::new(EcdsaSigner::new()) as Arc<dyn SigningService>,
            Arc::new(Ed25519Signer::new()) as Arc<dyn SigningService>,
        ] {
            let mut ledger =
                Ledger::new(Arc::clone(&signer), Arc::new(SeededRandomness::new(3))).unwrap();
            let block = ledger.append("attested").unwrap();
            let keypair = ledger.signing_service().generate_key_pair().unwrap();
            let other = ledger.signing_service().generate_key_pair().unwrap();

            let signature = ledger.attest_block(&block, &keypair.private_key).unwrap();
            assert!(ledger.verify_attestation(&block, &signature, &keypair.public_key));
            assert!(!ledger.verify_attestation(&block, &signature, &other.public_key));
            assert!(!ledger.verify_attestation(ledger.genesis(), &signature, &keypair.public_key));
        }
    }

    #[test]
    fn test_block_display() {
        let ledger = test_ledger();
        let rendered = ledger.genesis().to_string();
        assert!(rendered.starts_with("Block 0:"));
        assert!(rendered.contains("PreviousHash: 0"));
        assert!(rendered.contains("Genesis Block"));
    }
}
