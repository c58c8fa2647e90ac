//! # Gateway Crypto
//!
//! The cryptographic half of the relay protocol: the authorization digest
//! that binds a canonical batch encoding to a nonce, and the secp256k1
//! verifier that checks an owner's signature over that digest.
//!
//! ## Scheme
//!
//! - Digest: `Keccak256(encoded_batch || nonce_be)`; see [`digest`] for the
//!   exact byte layout.
//! - Signature: 64-byte fixed `r || s` ECDSA over `SHA-256(digest)`, verified
//!   against a SEC1-encoded secp256k1 public key (33-byte compressed or
//!   65-byte uncompressed).
//!
//! ## Security Notes
//!
//! - **Fail-closed**: [`Secp256k1Verifier::verify`] returns `false` for any
//!   malformed input; it never panics and never errors past the caller.
//! - **Malleability**: high-S signatures are rejected (constant-time check).
//! - No secret material lives in this crate; only verification.

pub mod digest;
pub mod ecdsa;
pub mod errors;

pub use digest::{authorization_digest, keccak256};
pub use ecdsa::{verification_schemes, Secp256k1Verifier};
pub use errors::CryptoError;

#[cfg(any(test, feature = "test-helpers"))]
pub use ecdsa::test_helpers;
