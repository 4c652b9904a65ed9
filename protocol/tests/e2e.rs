//! End-to-end tests for the chain engine.
//!
//! These drive the public API only: open a store, append, look blocks up,
//! tamper with stored bytes behind the engine's back, and check that
//! validation notices. Each test builds its own store.

use std::sync::Arc;

use serde_json::json;

use hashchain::config::GENESIS_BODY;
use hashchain::storage::{
    Block, BlockStore, Chain, ChainError, IntegrityError, MemoryStore, SledStore, Violation,
};
use hashchain::ChainService;

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

fn memory_chain() -> (Chain<Arc<MemoryStore>>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let chain = Chain::open(Arc::clone(&store)).expect("open chain");
    (chain, store)
}

/// Read the raw block at `height`, apply `edit`, and write it back without
/// touching its hash.
fn tamper<S: BlockStore>(store: &S, height: u64, edit: impl FnOnce(&mut Block)) {
    let bytes = store.get(height).unwrap().expect("block to tamper with");
    let mut block = Block::from_bytes(&bytes).unwrap();
    edit(&mut block);
    store.put(height, &block.to_bytes().unwrap()).unwrap();
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn append_two_payloads_and_validate() {
    let (mut chain, _store) = memory_chain();

    chain.append("A").unwrap();
    chain.append("B").unwrap();

    assert_eq!(chain.height(), 2);
    assert_eq!(chain.get_block(0).unwrap().body, json!(GENESIS_BODY));
    assert_eq!(chain.get_block(1).unwrap().body, json!("A"));
    assert_eq!(chain.get_block(2).unwrap().body, json!("B"));
    assert_eq!(chain.validate_chain().unwrap(), Vec::<u64>::new());
}

#[test]
fn genesis_invariant_on_fresh_storage() {
    let (chain, store) = memory_chain();

    assert_eq!(store.len(), 1);
    let genesis = chain.get_block(0).unwrap();
    assert_eq!(genesis.height, 0);
    assert_eq!(genesis.previous_block_hash, "");
    assert!(chain.validate_block(&genesis));
}

#[test]
fn appends_are_contiguous_and_linked() {
    let (mut chain, _store) = memory_chain();
    const N: u64 = 25;
    for i in 0..N {
        chain.append(json!({ "seq": i })).unwrap();
    }

    let blocks = chain.blocks().unwrap();
    assert_eq!(blocks.len() as u64, N + 1);
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.height, i as u64);
        if i > 0 {
            assert_eq!(block.previous_block_hash, blocks[i - 1].hash);
        }
    }
}

#[test]
fn revalidation_is_idempotent() {
    let (mut chain, _store) = memory_chain();
    chain.append("payload").unwrap();

    let block = chain.get_block(1).unwrap();
    for _ in 0..3 {
        assert!(chain.validate_block(&block));
        assert_eq!(block.compute_hash(), block.hash);
    }
    assert_eq!(chain.get_block(1).unwrap(), block);
}

fn mixed_payloads() -> Vec<serde_json::Value> {
    vec![
        json!(3.141592653589793),
        json!(-2.2250738585072014e-308),
        json!(1.0715660391465826e-75),
        json!(u64::MAX),
        json!(i64::MIN),
        json!("naïve café ✓ 漢字 🚀"),
        json!("quotes \" and \\ and \n newlines"),
        json!({ "order": { "qty": 0.000123, "price": 1e21, "tags": ["x", null, true] } }),
        json!([1.5, [2.25, { "deep": -0.0 }], "end"]),
        json!(null),
    ]
}

#[test]
fn mixed_payloads_validate_after_read_back() {
    let (mut chain, _store) = memory_chain();
    for body in mixed_payloads() {
        let block = chain.append(body.clone()).unwrap();
        let stored = chain.get_block(block.height).unwrap();
        assert_eq!(stored.body, body);
        assert!(chain.validate_block_at(block.height).unwrap());
    }
    assert_eq!(chain.validate_chain().unwrap(), Vec::<u64>::new());
}

#[test]
fn mixed_payloads_validate_after_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let mut chain = Chain::open(SledStore::open(dir.path()).unwrap()).unwrap();
        for body in mixed_payloads() {
            chain.append(body).unwrap();
        }
        chain.close().unwrap();
    }

    let chain = Chain::open(SledStore::open(dir.path()).unwrap()).unwrap();
    let bodies: Vec<_> = chain.blocks().unwrap().into_iter().skip(1).map(|b| b.body).collect();
    assert_eq!(bodies, mixed_payloads());
    assert_eq!(chain.validate_chain().unwrap(), Vec::<u64>::new());
}

#[test]
fn tampering_any_body_is_detected() {
    for target in 0..4u64 {
        let (mut chain, store) = memory_chain();
        for i in 0..3 {
            chain.append(format!("p{i}")).unwrap();
        }

        tamper(&*store, target, |b| b.body = json!("forged"));

        assert!(!chain.validate_block_at(target).unwrap(), "block {target}");
        let failed = chain.validate_chain().unwrap();
        assert!(failed.contains(&target), "block {target} not in {failed:?}");
    }
}

#[test]
fn link_break_is_localized() {
    let (mut chain, store) = memory_chain();
    for i in 0..4 {
        chain.append(format!("p{i}")).unwrap();
    }

    tamper(&*store, 1, |b| b.previous_block_hash = "bad".to_string());

    let failed = chain.validate_chain().unwrap();
    assert!(failed.contains(&1));
    for untouched in 2..=4 {
        assert!(!failed.contains(&untouched), "{untouched} in {failed:?}");
    }
}

#[test]
fn audit_explains_each_index() {
    let (mut chain, store) = memory_chain();
    chain.append("x").unwrap();
    chain.append("y").unwrap();

    tamper(&*store, 1, |b| b.body = json!("z"));

    let findings = chain.audit().unwrap();
    assert_eq!(findings.len(), 1);
    match &findings[0].violation {
        Violation::Integrity(IntegrityError::HashMismatch {
            height,
            stored,
            computed,
        }) => {
            assert_eq!(*height, 1);
            assert_ne!(stored, computed);
        }
        other => panic!("unexpected finding: {other:?}"),
    }
}

#[test]
fn lookup_boundaries() {
    let (mut chain, _store) = memory_chain();
    chain.append("only").unwrap();
    let len = chain.len();

    assert!(matches!(
        chain.get_block(len),
        Err(ChainError::NotFound(h)) if h == len
    ));
    for h in 0..len {
        assert_eq!(chain.get_block(h).unwrap().height, h);
    }
}

// ---------------------------------------------------------------------------
// Persistence
// ---------------------------------------------------------------------------

#[test]
fn chain_survives_restart_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");

    let tip_hash = {
        let mut chain = Chain::open(SledStore::open(dir.path()).unwrap()).unwrap();
        chain.append("before restart").unwrap();
        let hash = chain.tip().hash.clone();
        chain.close().unwrap();
        hash
    };

    let mut chain = Chain::open(SledStore::open(dir.path()).unwrap()).unwrap();
    assert_eq!(chain.height(), 1);
    assert_eq!(chain.tip().hash, tip_hash);

    let next = chain.append("after restart").unwrap();
    assert_eq!(next.height, 2);
    assert_eq!(next.previous_block_hash, tip_hash);
    assert!(chain.validate_chain().unwrap().is_empty());
}

#[test]
fn sled_chain_past_ten_blocks_stays_ordered() {
    let store = SledStore::open_temporary().unwrap();
    let mut chain = Chain::open(store).unwrap();
    for i in 0..15 {
        chain.append(i).unwrap();
    }

    assert_eq!(chain.height(), 15);
    assert!(chain.validate_chain().unwrap().is_empty());
    let heights: Vec<u64> = chain.blocks().unwrap().iter().map(|b| b.height).collect();
    assert_eq!(heights, (0..=15).collect::<Vec<_>>());
}

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

#[tokio::test]
async fn service_over_sled_store() {
    let dir = tempfile::tempdir().expect("tempdir");
    let chain = Chain::open(SledStore::open(dir.path()).unwrap()).unwrap();
    let handle = ChainService::spawn(chain);

    handle.append("A").await.unwrap();
    handle.append("B").await.unwrap();
    assert_eq!(handle.height().await.unwrap(), 2);
    assert!(handle.validate_chain().await.unwrap().is_empty());
    handle.shutdown().await.unwrap();

    let reopened = Chain::open(SledStore::open(dir.path()).unwrap()).unwrap();
    assert_eq!(reopened.get_block(2).unwrap().body, json!("B"));
}
