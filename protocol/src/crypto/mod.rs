//! # Cryptographic Primitives
//!
//! Only content hashing lives here. The chain makes no signature claims:
//! a block is trusted as far as its digest recomputes, nothing more.

pub mod hash;

pub use hash::{sha256, sha256_hex};
