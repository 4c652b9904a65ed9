//! # Storage Module
//!
//! The chain data model and everything needed to persist it.
//!
//! ## Architecture
//!
//! ```text
//! block.rs : Block structure, hash computation, integrity findings
//! chain.rs : Chain engine: genesis, append, lookup, validation
//! store.rs : BlockStore trait: put / get / ordered scan by height
//! db.rs    : sled-backed BlockStore
//! memory.rs: in-memory BlockStore
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! payload → Chain::append → Block (linked, hashed) → BlockStore::put
//!                                                        │
//! Chain::validate_chain ◄── Block::verify ◄── BlockStore::scan
//! ```
//!
//! ## Design Decisions
//!
//! 1. **JSON on disk.** The hash is defined over the block's JSON bytes, so
//!    the stored form is the hashed form. No second encoding to keep in
//!    sync with the digest.
//!
//! 2. **Stores are dumb.** A store maps heights to bytes and nothing else.
//!    Linking, hashing and checking all live in the engine, so a test
//!    double only has to implement three methods.

pub mod block;
pub mod chain;
pub mod db;
pub mod memory;
pub mod store;

pub use block::{Block, IntegrityError};
pub use chain::{Chain, ChainError, ChainResult, Finding, Tip, Violation};
pub use db::SledStore;
pub use memory::MemoryStore;
pub use store::{BlockStore, Scan, StoreError, StoreResult};
