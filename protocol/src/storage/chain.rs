//! # Chain Engine
//!
//! Owns the integrity protocol: turning payloads into linked, hashed blocks,
//! persisting them through a [`BlockStore`], and checking stored blocks
//! against the three chain invariants:
//!
//! 1. Exactly one genesis block at height 0, created on first open.
//! 2. `chain[i].previous_block_hash == chain[i - 1].hash` for every `i > 0`.
//! 3. `chain[i].hash` equals the digest recomputed from `chain[i]`.
//!
//! ## Appending
//!
//! ```text
//! tip (length, hash) ──► Block { height = length,
//!                                time = now (s),
//!                                previousBlockHash = tip.hash | "" }
//!                          │
//!                          ├─► hash = SHA-256(json with hash = "")
//!                          └─► store.put(height, json) ──► tip advances
//! ```
//!
//! The tip is loaded by a full scan at open and then maintained in memory.
//! It only advances after the store accepts the write, so a failed append
//! leaves the engine exactly where it was.
//!
//! ## Validation
//!
//! Validation never fails on bad data. Broken invariants come back as
//! [`Finding`]s or index lists; only storage failures are errors.

use serde_json::Value;
use tracing::{debug, info, warn};

use super::block::{Block, IntegrityError};
use super::store::{BlockStore, StoreError};
use crate::config::GENESIS_BODY;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors from chain operations. Integrity violations are not errors.
#[derive(Debug, thiserror::Error)]
pub enum ChainError {
    #[error("storage read failed: {0}")]
    StorageRead(#[source] StoreError),

    #[error("storage write failed: {0}")]
    StorageWrite(#[source] StoreError),

    #[error("no block at height {0}")]
    NotFound(u64),

    #[error("record at height {height} is not a block: {reason}")]
    Corrupt { height: u64, reason: String },

    #[error("block encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("chain service is closed")]
    ServiceClosed,
}

pub type ChainResult<T> = Result<T, ChainError>;

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

/// One integrity violation located at a chain position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    /// Zero-based position in the scan where the violation was detected.
    pub index: u64,
    pub violation: Violation,
}

/// What a [`Finding`] found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// The block at this position is well-formed but breaks an invariant.
    Integrity(IntegrityError),
    /// The stored bytes at this position do not decode as a block.
    Undecodable(String),
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.violation {
            Violation::Integrity(e) => write!(f, "[{}] {}", self.index, e),
            Violation::Undecodable(reason) => {
                write!(f, "[{}] undecodable record: {}", self.index, reason)
            }
        }
    }
}

/// Length of the chain and hash of its last block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tip {
    pub length: u64,
    pub hash: String,
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// The chain engine over a block store.
///
/// `append` takes `&mut self`: one engine is one writer. Sharing an engine
/// between tasks goes through [`ChainService`](crate::service::ChainService).
#[derive(Debug)]
pub struct Chain<S> {
    store: S,
    tip: Tip,
}

impl<S: BlockStore> Chain<S> {
    /// Load the chain from `store`, adding the genesis block if it is empty.
    pub fn open(store: S) -> ChainResult<Self> {
        let tip = read_tip(&store)?;
        let mut chain = Chain { store, tip };

        if chain.tip.length == 0 {
            info!("chain is empty, adding genesis block");
            chain.append(GENESIS_BODY)?;
        } else {
            info!(height = chain.height(), tip = %chain.tip.hash, "chain loaded");
        }

        Ok(chain)
    }

    /// Append a new block carrying `body`.
    pub fn append(&mut self, body: impl Into<Value>) -> ChainResult<Block> {
        self.append_block(Block::new(body))
    }

    /// Link, hash and persist `block`. Any values already in its height,
    /// time, previous-hash or hash fields are overwritten.
    pub fn append_block(&mut self, mut block: Block) -> ChainResult<Block> {
        block.height = self.tip.length;
        block.time = now_secs();
        block.previous_block_hash = if block.is_genesis() {
            String::new()
        } else {
            self.tip.hash.clone()
        };
        block.hash = block.compute_hash();

        let bytes = block.to_bytes()?;
        if let Err(e) = self.store.put(block.height, &bytes) {
            warn!(height = block.height, error = %e, "block submission failed");
            return Err(ChainError::StorageWrite(e));
        }

        self.tip = Tip {
            length: block.height + 1,
            hash: block.hash.clone(),
        };
        info!(height = block.height, hash = %block.hash, "block appended");
        Ok(block)
    }

    /// Height of the last block, or -1 when the chain has no blocks.
    pub fn height(&self) -> i64 {
        self.tip.length as i64 - 1
    }

    /// Number of blocks in the chain.
    pub fn len(&self) -> u64 {
        self.tip.length
    }

    pub fn is_empty(&self) -> bool {
        self.tip.length == 0
    }

    pub fn tip(&self) -> &Tip {
        &self.tip
    }

    /// Point lookup. Heights past the tip are `NotFound`, never padded.
    pub fn get_block(&self, height: u64) -> ChainResult<Block> {
        let bytes = self
            .store
            .get(height)
            .map_err(ChainError::StorageRead)?
            .ok_or(ChainError::NotFound(height))?;
        Block::from_bytes(&bytes).map_err(|e| ChainError::Corrupt {
            height,
            reason: e.to_string(),
        })
    }

    /// Whether `block`'s stored hash matches its contents. Mismatches are
    /// logged with the block height and both digests.
    pub fn validate_block(&self, block: &Block) -> bool {
        match block.verify() {
            Ok(()) => true,
            Err(e) => {
                warn!("{}", e);
                false
            }
        }
    }

    /// Load the block at `height` and validate it.
    pub fn validate_block_at(&self, height: u64) -> ChainResult<bool> {
        let block = self.get_block(height)?;
        Ok(self.validate_block(&block))
    }

    /// Every block in height order. Fails on the first undecodable record.
    pub fn blocks(&self) -> ChainResult<Vec<Block>> {
        let mut blocks = Vec::new();
        for (position, item) in self.store.scan().enumerate() {
            let bytes = item.map_err(ChainError::StorageRead)?;
            let block = Block::from_bytes(&bytes).map_err(|e| ChainError::Corrupt {
                height: position as u64,
                reason: e.to_string(),
            })?;
            blocks.push(block);
        }
        debug!(count = blocks.len(), "chain scanned");
        Ok(blocks)
    }

    /// Full integrity audit in one scan.
    ///
    /// For each position `i`:
    /// - the record must decode, and its height must equal `i`;
    /// - its stored hash must match its contents (the last block included);
    /// - if a successor exists, its hash must equal the successor's
    ///   `previousBlockHash`. A broken link is reported at `i`, the
    ///   predecessor side.
    ///
    /// Findings come back sorted by index.
    pub fn audit(&self) -> ChainResult<Vec<Finding>> {
        let mut slots: Vec<Result<Block, String>> = Vec::new();
        for item in self.store.scan() {
            let bytes = item.map_err(ChainError::StorageRead)?;
            slots.push(Block::from_bytes(&bytes).map_err(|e| e.to_string()));
        }

        let mut findings = Vec::new();
        for (i, slot) in slots.iter().enumerate() {
            let index = i as u64;
            let block = match slot {
                Ok(block) => block,
                Err(reason) => {
                    findings.push(Finding {
                        index,
                        violation: Violation::Undecodable(reason.clone()),
                    });
                    continue;
                }
            };

            if block.height != index {
                findings.push(Finding {
                    index,
                    violation: Violation::Integrity(IntegrityError::HeightMismatch {
                        position: index,
                        height: block.height,
                    }),
                });
            }

            if let Err(e) = block.verify() {
                findings.push(Finding {
                    index,
                    violation: Violation::Integrity(e),
                });
            }

            if let Some(Ok(next)) = slots.get(i + 1) {
                if block.hash != next.previous_block_hash {
                    findings.push(Finding {
                        index,
                        violation: Violation::Integrity(IntegrityError::BrokenLink {
                            height: block.height,
                            hash: block.hash.clone(),
                            successor_previous: next.previous_block_hash.clone(),
                        }),
                    });
                }
            }
        }

        for finding in &findings {
            warn!("{}", finding);
        }
        if findings.is_empty() {
            info!(blocks = slots.len(), "no errors detected");
        } else {
            warn!(errors = findings.len(), "chain validation found errors");
        }

        Ok(findings)
    }

    /// Indices of blocks failing a content or link check, ascending.
    ///
    /// An index appears once per failed check, so a block that fails both
    /// its own hash and its forward link is listed twice. Empty means sound.
    pub fn validate_chain(&self) -> ChainResult<Vec<u64>> {
        Ok(self.audit()?.into_iter().map(|f| f.index).collect())
    }

    /// Borrow the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Flush the store and release the engine.
    pub fn close(self) -> ChainResult<S> {
        self.store.flush().map_err(ChainError::StorageWrite)?;
        debug!(length = self.tip.length, "chain closed");
        Ok(self.store)
    }
}

/// Count stored records and read the hash of the last one.
fn read_tip<S: BlockStore>(store: &S) -> ChainResult<Tip> {
    let mut length = 0u64;
    let mut last = None;
    for item in store.scan() {
        last = Some(item.map_err(ChainError::StorageRead)?);
        length += 1;
    }

    match last {
        None => Ok(Tip::default()),
        Some(bytes) => {
            let block = Block::from_bytes(&bytes).map_err(|e| ChainError::Corrupt {
                height: length - 1,
                reason: e.to_string(),
            })?;
            Ok(Tip {
                length,
                hash: block.hash,
            })
        }
    }
}

/// Wall-clock time truncated to whole seconds. Part of the hash preimage.
fn now_secs() -> u64 {
    u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
