//! # Block Store Interface
//!
//! The chain engine never touches a database directly. It talks to a
//! [`BlockStore`]: a key-value map from block height to serialized block
//! bytes, with point reads, point writes, and an ordered full scan.
//!
//! Implementations:
//!
//! | Type                                      | Backing              | Use          |
//! |-------------------------------------------|----------------------|--------------|
//! | [`SledStore`](super::db::SledStore)       | sled tree on disk    | production   |
//! | [`MemoryStore`](super::memory::MemoryStore) | `BTreeMap` in memory | tests, demos |
//!
//! Values are opaque to the store. It does not know what a block is and
//! never validates what it is handed.

/// Errors raised by a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Ordered scan over stored values, ascending by height.
///
/// A scan is a one-shot view. Re-invoke [`BlockStore::scan`] for a fresh one.
pub type Scan<'a> = Box<dyn Iterator<Item = StoreResult<Vec<u8>>> + 'a>;

/// Key-value storage for serialized blocks, keyed by height.
///
/// Writes go through `&self`: backends provide their own interior
/// synchronization, the same way a sled `Tree` does. This keeps a store
/// shareable between the engine and anything inspecting it.
pub trait BlockStore: Send + Sync {
    /// Write `value` at `height`, replacing whatever was there.
    fn put(&self, height: u64, value: &[u8]) -> StoreResult<()>;

    /// Read the value at `height`. `Ok(None)` when nothing is stored there.
    fn get(&self, height: u64) -> StoreResult<Option<Vec<u8>>>;

    /// Every stored value in ascending height order.
    fn scan(&self) -> Scan<'_>;

    /// Block until pending writes are durable. No-op for volatile stores.
    fn flush(&self) -> StoreResult<()> {
        Ok(())
    }
}

impl<S: BlockStore + ?Sized> BlockStore for std::sync::Arc<S> {
    fn put(&self, height: u64, value: &[u8]) -> StoreResult<()> {
        (**self).put(height, value)
    }

    fn get(&self, height: u64) -> StoreResult<Option<Vec<u8>>> {
        (**self).get(height)
    }

    fn scan(&self) -> Scan<'_> {
        (**self).scan()
    }

    fn flush(&self) -> StoreResult<()> {
        (**self).flush()
    }
}
