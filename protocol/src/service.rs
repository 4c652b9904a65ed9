//! # Chain Service
//!
//! A single worker that owns a [`Chain`] and processes requests one at a
//! time. Any number of async callers can hold a [`ChainHandle`]; the worker
//! is the one serialization point, so an append's read-tip / write-block
//! sequence is never interleaved with another append or with a reader.
//!
//! ```text
//!  ChainHandle ─┐
//!  ChainHandle ─┼─► mpsc ─► worker (blocking thread) ─► Chain ─► BlockStore
//!  ChainHandle ─┘            │
//!                            └─► oneshot reply per request
//! ```
//!
//! The worker runs on tokio's blocking pool because every engine call is a
//! blocking storage call.

use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::config::SERVICE_CHANNEL_CAPACITY;
use crate::storage::block::Block;
use crate::storage::chain::{Chain, ChainError, ChainResult};
use crate::storage::store::BlockStore;

type Reply<T> = oneshot::Sender<T>;

enum Request {
    Append {
        body: Value,
        reply: Reply<ChainResult<Block>>,
    },
    Height {
        reply: Reply<i64>,
    },
    GetBlock {
        height: u64,
        reply: Reply<ChainResult<Block>>,
    },
    ValidateBlockAt {
        height: u64,
        reply: Reply<ChainResult<bool>>,
    },
    ValidateChain {
        reply: Reply<ChainResult<Vec<u64>>>,
    },
    Blocks {
        reply: Reply<ChainResult<Vec<Block>>>,
    },
    Shutdown {
        reply: Reply<ChainResult<()>>,
    },
}

/// Spawns the worker that owns a chain.
pub struct ChainService;

impl ChainService {
    /// Move `chain` onto a dedicated worker and return a handle to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<S>(chain: Chain<S>) -> ChainHandle
    where
        S: BlockStore + 'static,
    {
        let (tx, rx) = mpsc::channel(SERVICE_CHANNEL_CAPACITY);
        tokio::task::spawn_blocking(move || run_worker(chain, rx));
        ChainHandle { tx }
    }
}

fn run_worker<S: BlockStore>(mut chain: Chain<S>, mut rx: mpsc::Receiver<Request>) {
    debug!("chain service started");
    // Dropped reply receivers mean the caller gave up; nothing to do then.
    while let Some(request) = rx.blocking_recv() {
        match request {
            Request::Append { body, reply } => {
                let _ = reply.send(chain.append(body));
            }
            Request::Height { reply } => {
                let _ = reply.send(chain.height());
            }
            Request::GetBlock { height, reply } => {
                let _ = reply.send(chain.get_block(height));
            }
            Request::ValidateBlockAt { height, reply } => {
                let _ = reply.send(chain.validate_block_at(height));
            }
            Request::ValidateChain { reply } => {
                let _ = reply.send(chain.validate_chain());
            }
            Request::Blocks { reply } => {
                let _ = reply.send(chain.blocks());
            }
            Request::Shutdown { reply } => {
                rx.close();
                let _ = reply.send(chain.close().map(|_| ()));
                debug!("chain service stopped");
                return;
            }
        }
    }

    // Every handle dropped without an explicit shutdown.
    if let Err(e) = chain.close() {
        warn!(error = %e, "failed to flush chain store on service exit");
    }
    debug!("chain service stopped");
}

/// Cloneable async front end to a running [`ChainService`].
#[derive(Clone, Debug)]
pub struct ChainHandle {
    tx: mpsc::Sender<Request>,
}

impl ChainHandle {
    async fn call<T>(&self, make: impl FnOnce(Reply<T>) -> Request) -> ChainResult<T> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(make(reply))
            .await
            .map_err(|_| ChainError::ServiceClosed)?;
        rx.await.map_err(|_| ChainError::ServiceClosed)
    }

    pub async fn append(&self, body: impl Into<Value>) -> ChainResult<Block> {
        let body = body.into();
        self.call(|reply| Request::Append { body, reply }).await?
    }

    pub async fn height(&self) -> ChainResult<i64> {
        self.call(|reply| Request::Height { reply }).await
    }

    pub async fn get_block(&self, height: u64) -> ChainResult<Block> {
        self.call(|reply| Request::GetBlock { height, reply }).await?
    }

    pub async fn validate_block_at(&self, height: u64) -> ChainResult<bool> {
        self.call(|reply| Request::ValidateBlockAt { height, reply })
            .await?
    }

    pub async fn validate_chain(&self) -> ChainResult<Vec<u64>> {
        self.call(|reply| Request::ValidateChain { reply }).await?
    }

    pub async fn blocks(&self) -> ChainResult<Vec<Block>> {
        self.call(|reply| Request::Blocks { reply }).await?
    }

    /// Flush the store and stop the worker. Later calls on any clone of
    /// this handle fail with [`ChainError::ServiceClosed`].
    pub async fn shutdown(&self) -> ChainResult<()> {
        self.call(|reply| Request::Shutdown { reply }).await?
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Request::Append { .. } => "Append",
            Request::Height { .. } => "Height",
            Request::GetBlock { .. } => "GetBlock",
            Request::ValidateBlockAt { .. } => "ValidateBlockAt",
            Request::ValidateChain { .. } => "ValidateChain",
            Request::Blocks { .. } => "Blocks",
            Request::Shutdown { .. } => "Shutdown",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
