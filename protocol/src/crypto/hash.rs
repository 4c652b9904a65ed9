//! # Hashing Utilities
//!
//! Block digests are SHA-256 over the block's canonical JSON bytes, carried
//! around as lowercase hex strings. The hex form is what gets stored in
//! `hash` and `previousBlockHash`, so it is also what goes back into the
//! next block's preimage. Upper-case hex would produce a different chain.

use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use hashchain::crypto::sha256;
///
/// let hash = sha256(b"hashchain");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut output = [0u8; 32];
    output.copy_from_slice(&result);
    output
}

/// Compute SHA-256 and return the digest as lowercase hex.
///
/// This is the exact string form stored in a block's `hash` field.
///
/// ```
/// use hashchain::crypto::sha256_hex;
///
/// assert_eq!(
///     sha256_hex(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
/// );
/// ```
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}
