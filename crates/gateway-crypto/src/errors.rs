//! Error types for signature verification.

use thiserror::Error;

/// Reasons a signature or key fails structural validation.
///
/// These never escape [`crate::Secp256k1Verifier::verify`], which collapses
/// every failure into `false`; they exist for the fallible inner path and for
/// key sanitation during owner rotation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// The public key is not a valid SEC1-encoded secp256k1 point.
    #[error("invalid secp256k1 public key")]
    InvalidPublicKey,

    /// The signature is not exactly 64 bytes of `r || s`.
    #[error("invalid signature length: expected 64, got {0}")]
    InvalidSignatureLength(usize),

    /// The signature scalars do not parse (zero or out of range).
    #[error("invalid signature encoding")]
    InvalidSignature,

    /// The signature has a high S value and was rejected as malleable.
    #[error("malleable signature (high S value)")]
    MalleableSignature,
}
