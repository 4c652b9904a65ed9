//! # Chain Configuration & Constants
//!
//! Every fixed value the chain format depends on lives here. Some of these
//! feed directly into block hashes, so changing them after the first block
//! is written invalidates every stored digest. Treat them as part of the
//! on-disk format, not as tuning knobs.

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Body of the block synthesized at height 0 when a store is opened empty.
pub const GENESIS_BODY: &str = "First Block - Genesis";

/// Content digest used for block hashes. 256-bit, hex-encoded on the wire.
pub const HASH_ALGORITHM: &str = "SHA-256";

/// Digest length in bytes.
pub const HASH_OUTPUT_LENGTH: usize = 32;

/// Length of the lowercase hex encoding of a digest.
pub const HASH_HEX_LENGTH: usize = HASH_OUTPUT_LENGTH * 2;

/// Chain format version. Bump on any change to the serialized field set,
/// field order, or timestamp precision.
pub const FORMAT_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

/// Default on-disk location of the chain data.
pub const DEFAULT_DATA_DIR: &str = "./chaindata";

/// Name of the sled tree holding serialized blocks keyed by height.
pub const BLOCKS_TREE: &str = "blocks";

// ---------------------------------------------------------------------------
// Service
// ---------------------------------------------------------------------------

/// Request queue depth for the chain service worker. Callers beyond this
/// wait for a slot rather than failing.
pub const SERVICE_CHANNEL_CAPACITY: usize = 64;
