//! # Authorization Digest
//!
//! Combines the canonical encoding of a batch with the gateway's current
//! nonce into the fixed-size digest the owner signs.
//!
//! ## Byte layout
//!
//! ```text
//! digest = Keccak256( encoded_batch || nonce.to_be_bytes() )
//! ```
//!
//! The encoded batch comes first, followed by the nonce as exactly 8
//! big-endian bytes. Relayers must reproduce this layout bit-for-bit: a
//! mismatch does not fail loudly, it just yields a signature that never
//! verifies.

use gateway_types::Hash;
use sha3::{Digest, Keccak256};

/// Compute a Keccak-256 hash.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Compute the authorization digest for a batch at a given nonce.
///
/// The digest has no lifecycle of its own: it is recomputed fresh for every
/// signed submission and never stored. A digest is valid for exactly one
/// nonce value; once that nonce is consumed the same signature can never
/// verify again.
#[must_use]
pub fn authorization_digest(encoded_batch: &[u8], nonce: u64) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(encoded_batch);
    hasher.update(nonce.to_be_bytes());
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

// =============================================================================
// TESTS
// =============================================================================
