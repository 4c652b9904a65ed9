//! In-memory [`BlockStore`] for tests and throwaway chains.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use super::store::{BlockStore, Scan, StoreError, StoreResult};

/// Volatile block store. A `BTreeMap` keeps scans in height order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<u64, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl BlockStore for MemoryStore {
    fn put(&self, height: u64, value: &[u8]) -> StoreResult<()> {
        self.entries.write().insert(height, value.to_vec());
        Ok(())
    }

    fn get(&self, height: u64) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.entries.read().get(&height).cloned())
    }

    fn scan(&self) -> Scan<'_> {
        // Snapshot under the read lock so the guard is not held across
        // the caller's iteration.
        let snapshot: Vec<Vec<u8>> = self.entries.read().values().cloned().collect();
        Box::new(snapshot.into_iter().map(Ok::<_, StoreError>))
    }
}
