use crate::blockchain::core::chain::{Block, Ledger};
use crate::error::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Cloneable handle for a ledger with several writers.
///
/// Every mutation runs under the write lock, so read-last, build and
/// validate-and-append happen as one step and two writers can never build on
/// the same tail. Readers get `Arc<Block>` snapshots that stay valid after
/// later appends.
#[derive(Clone, Debug)]
pub struct SharedLedger {
    inner: Arc<RwLock<Ledger>>,
}

impl SharedLedger {
    pub fn new(ledger: Ledger) -> Self {
        SharedLedger {
            inner: Arc::new(RwLock::new(ledger)),
        }
    }

    /// Builds a block for `data` on the current tail and appends it.
    pub fn append(&self, data: impl Into<String>) -> Result<Arc<Block>> {
        self.inner.write().append(data)
    }

    /// Appends a candidate built elsewhere, e.g. received from a peer.
    pub fn submit(&self, candidate: Block) -> Result<()> {
        self.inner.write().add_block(candidate)
    }

    /// Builds a detached candidate without appending. Another writer may
    /// move the tail before it is submitted, in which case `submit` rejects
    /// it with an integrity error.
    pub fn create_block(&self, data: impl Into<String>) -> Result<Block> {
        self.inner.read().create_block(data)
    }

    pub fn snapshot(&self) -> Vec<Arc<Block>> {
        self.inner.read().blocks().to_vec()
    }

    pub fn last_block(&self) -> Arc<Block> {
        Arc::clone(self.inner.read().last_block())
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn validate_chain(&self) -> Result<()> {
        self.inner.read().validate_chain()
    }

    /// Runs `f` against the ledger under the read lock.
    pub fn with_ledger<R>(&self, f: impl FnOnce(&Ledger) -> R) -> R {
        f(&self.inner.read())
    }
}

impl From<Ledger> for SharedLedger {
    fn from(ledger: Ledger) -> Self {
        SharedLedger::new(ledger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EcdsaSigner;
    use crate::rng::OsRandomness;
    use std::thread;

    fn shared_ledger() -> SharedLedger {
        Ledger::new(Arc::new(EcdsaSigner::new()), Arc::new(OsRandomness::new()))
            .unwrap()
            .into()
    }

    #[test]
    fn test_concurrent_appends_keep_chain_valid() {
        let ledger = shared_ledger();
        let handles: Vec<_> = (0..8)
            .map(|worker| {
                let ledger = ledger.clone();
                thread::spawn(move || {
                    for i in 0..25 {
                        ledger.append(format!("worker {} tx {}", worker, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(ledger.len(), 1 + 8 * 25);
        ledger.validate_chain().unwrap();
        for (i, block) in ledger.snapshot().iter().enumerate() {
            assert_eq!(block.index, i as u64);
        }
    }

    #[test]
    fn test_snapshot_survives_later_appends() {
        let ledger = shared_ledger();
        ledger.append("a").unwrap();
        let snapshot = ledger.snapshot();

        ledger.append("b").unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(ledger.len(), 3);
        assert!(Arc::ptr_eq(&snapshot[1], &ledger.snapshot()[1]));
    }

    #[test]
    fn test_raced_candidate_is_rejected() {
        let ledger = shared_ledger();
        let candidate = ledger.create_block("late").unwrap();
        ledger.append("early").unwrap();

        let err = ledger.submit(candidate).unwrap_err();
        assert!(err.is_integrity_violation());
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.last_block().transactions[0].data, "early");
    }

    #[test]
    fn test_with_ledger_reads_state() {
        let ledger = shared_ledger();
        let genesis_hash = ledger.with_ledger(|l| l.genesis().hash.clone());
        let block = ledger.append("x").unwrap();
        assert_eq!(block.previous_hash, genesis_hash);
        assert!(!ledger.is_empty());
    }
}
