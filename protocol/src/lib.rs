// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # hashchain Core Library
//!
//! An append-only chain of blocks, each one carrying an opaque payload and
//! the SHA-256 of its own contents, each one pointing at the hash of the
//! block before it. The chain lives in a key-value store keyed by height
//! and survives restarts.
//!
//! ## Architecture
//!
//! - **storage**: Block type, chain engine, and the stores behind it.
//! - **service**: Single-writer worker for sharing one chain across tasks.
//! - **crypto**: Content hashing.
//! - **config**: Format constants and defaults.
//!
//! ## Quick Start
//!
//! ```
//! use hashchain::storage::{Chain, MemoryStore};
//!
//! let mut chain = Chain::open(MemoryStore::new()).unwrap();
//! chain.append("A").unwrap();
//! chain.append("B").unwrap();
//!
//! assert_eq!(chain.height(), 2);
//! assert!(chain.validate_chain().unwrap().is_empty());
//! ```
//!
//! ## What this does not do
//!
//! No networking, no consensus, no signatures. Integrity here means the
//! stored bytes still hash to what they claim, and the links line up.

pub mod config;
pub mod crypto;
pub mod service;
pub mod storage;

pub use service::{ChainHandle, ChainService};
pub use storage::{Block, BlockStore, Chain, ChainError, ChainResult, MemoryStore, SledStore};
