//! # SledStore: Persistent Block Storage
//!
//! The on-disk [`BlockStore`], built on sled's embedded key-value store.
//!
//! ## Tree Layout
//!
//! | Tree     | Key              | Value               |
//! |----------|------------------|---------------------|
//! | `blocks` | `height` (8B BE) | block JSON (UTF-8)  |
//!
//! Heights are stored as big-endian u64 so that sled's lexicographic
//! ordering matches numeric ordering. A scan therefore yields height 2
//! before height 10, which string keys would not.

use sled::{Db, Tree};
use std::path::Path;

use super::store::{BlockStore, Scan, StoreError, StoreResult};
use crate::config::BLOCKS_TREE;

/// Persistent block store backed by a sled database.
///
/// # Thread Safety
///
/// sled trees support concurrent reads and serialized writes, so a
/// `SledStore` can be shared across threads via `Arc<SledStore>`. That says
/// nothing about chain-level ordering: two appenders racing on the same
/// store would still both pick the same next height.
#[derive(Debug, Clone)]
pub struct SledStore {
    db: Db,
    blocks: Tree,
}

impl SledStore {
    /// Open or create a store at the given filesystem path.
    ///
    /// If the directory doesn't exist, sled creates it. Existing blocks are
    /// available immediately.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// Create a store that lives in a temporary location and is removed
    /// when the last handle is dropped.
    pub fn open_temporary() -> StoreResult<Self> {
        let db = sled::Config::new().temporary(true).open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> StoreResult<Self> {
        let blocks = db.open_tree(BLOCKS_TREE)?;
        Ok(Self { db, blocks })
    }

    /// Number of values stored in the blocks tree.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

impl BlockStore for SledStore {
    fn put(&self, height: u64, value: &[u8]) -> StoreResult<()> {
        self.blocks.insert(height.to_be_bytes(), value)?;
        Ok(())
    }

    fn get(&self, height: u64) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.blocks.get(height.to_be_bytes())?.map(|v| v.to_vec()))
    }

    fn scan(&self) -> Scan<'_> {
        Box::new(
            self.blocks
                .iter()
                .values()
                .map(|res| res.map(|v| v.to_vec()).map_err(StoreError::from)),
        )
    }

    fn flush(&self) -> StoreResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
