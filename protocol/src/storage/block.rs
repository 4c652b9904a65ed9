//! # Block Structure
//!
//! A block is one entry in the chain: an opaque caller payload plus the
//! fields that pin it to its position and its predecessor.
//!
//! ## Serialized Layout
//!
//! ```text
//! {
//!   "hash":              "<64 hex chars>",   SHA-256 of this object with hash = ""
//!   "height":            0,                  zero-based position
//!   "body":              <any JSON>,         caller payload, never interpreted
//!   "time":              1700000000,         unix seconds, truncated
//!   "previousBlockHash": ""                  hash of block height-1, "" for genesis
//! }
//! ```
//!
//! Field order is part of the format. The digest is taken over these exact
//! bytes, so reordering fields, renaming them, or switching `time` to
//! milliseconds changes every hash in an existing chain.
//!
//! ## Hash Computation
//!
//! The preimage is the block serialized with `hash` set to the empty
//! string. It is built from a borrowed view of the block, so computing or
//! checking a digest never mutates the block it describes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::crypto::hash::sha256_hex;

// ---------------------------------------------------------------------------
// Integrity Findings
// ---------------------------------------------------------------------------

/// A broken chain invariant, reported as data rather than as a failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntegrityError {
    /// The stored hash does not match the digest of the block's contents.
    #[error("block #{height} invalid hash: {stored} <> {computed}")]
    HashMismatch {
        height: u64,
        stored: String,
        computed: String,
    },

    /// A block's hash is not what its successor recorded as its predecessor.
    #[error("block #{height} hash {hash} <> successor previousBlockHash {successor_previous}")]
    BrokenLink {
        height: u64,
        hash: String,
        successor_previous: String,
    },

    /// A record sits at a chain position that disagrees with its own height.
    #[error("record at position {position} claims height {height}")]
    HeightMismatch { position: u64, height: u64 },
}

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A single chain entry.
///
/// Only `body` comes from the caller. `height`, `time`, `previous_block_hash`
/// and `hash` are placeholders until the chain engine appends the block, and
/// are never changed after that.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Lowercase hex SHA-256 of the block with this field cleared.
    pub hash: String,
    /// Position in the chain. Genesis is 0.
    pub height: u64,
    /// Opaque payload.
    pub body: Value,
    /// Creation time in whole seconds since the Unix epoch.
    pub time: u64,
    /// `hash` of the block at `height - 1`; empty for genesis.
    #[serde(rename = "previousBlockHash")]
    pub previous_block_hash: String,
}

/// Borrowed view of a block with the hash field blanked. Field names and
/// order must stay identical to [`Block`].
#[derive(Serialize)]
struct Preimage<'a> {
    hash: &'static str,
    height: u64,
    body: &'a Value,
    time: u64,
    #[serde(rename = "previousBlockHash")]
    previous_block_hash: &'a str,
}

impl Block {
    /// Wrap a payload in an unlinked block with zeroed placeholder fields.
    ///
    /// ```
    /// use hashchain::storage::Block;
    ///
    /// let block = Block::new("hello");
    /// assert_eq!(block.height, 0);
    /// assert!(block.hash.is_empty());
    /// ```
    pub fn new(body: impl Into<Value>) -> Self {
        Block {
            hash: String::new(),
            height: 0,
            body: body.into(),
            time: 0,
            previous_block_hash: String::new(),
        }
    }

    /// Recompute the digest of this block's contents, ignoring `hash`.
    pub fn compute_hash(&self) -> String {
        let preimage = Preimage {
            hash: "",
            height: self.height,
            body: &self.body,
            time: self.time,
            previous_block_hash: &self.previous_block_hash,
        };
        let bytes = serde_json::to_vec(&preimage)
            .expect("preimage has only string map keys and writes into a Vec");
        sha256_hex(&bytes)
    }

    /// Check the stored hash against the recomputed one.
    pub fn verify(&self) -> Result<(), IntegrityError> {
        let computed = self.compute_hash();
        if self.hash == computed {
            Ok(())
        } else {
            Err(IntegrityError::HashMismatch {
                height: self.height,
                stored: self.hash.clone(),
                computed,
            })
        }
    }

    /// Whether this block sits at height 0 and so links to nothing.
    pub fn is_genesis(&self) -> bool {
        self.height == 0
    }

    /// Serialize to the stored JSON form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Decode a block from its stored JSON form.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
