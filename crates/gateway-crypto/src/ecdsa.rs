//! # ECDSA Verification (secp256k1)
//!
//! Verifies an owner's signature over an authorization digest.
//!
//! ## Scheme
//!
//! The signed message is `SHA-256(digest)`: the verifier prehashes the
//! 32-byte authorization digest once more with SHA-256 before the curve
//! operation, so relayer tooling that signs with a stock Cosmos-style
//! secp256k1 signer produces compatible signatures.
//!
//! ## Security Notes
//!
//! - High-S signatures are rejected (malleability), checked in constant time
//!   with the `subtle` crate.
//! - Scalar range validation (r, s in `[1, n-1]`) is delegated to `k256`'s
//!   signature parser.
//! - Verification is binary: any structural defect or curve failure is
//!   `false`, never an escaping error.

use crate::errors::CryptoError;
use gateway_types::Hash;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, VerifyingKey};
use sha2::{Digest, Sha256};
use subtle::Choice;
use zeroize::Zeroize;

/// Fixed signature length: 32-byte `r` followed by 32-byte `s`.
pub const SIGNATURE_LEN: usize = 64;

/// Length of a SEC1 compressed public key.
pub const COMPRESSED_PUBKEY_LEN: usize = 33;

/// Length of a SEC1 uncompressed public key.
pub const UNCOMPRESSED_PUBKEY_LEN: usize = 65;

/// Half of the secp256k1 curve order, for the malleability check.
/// n/2 where n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Names of the signature schemes this verifier supports.
///
/// A short, unpaginated list, mirroring the crypto helper's introspection
/// query.
#[must_use]
pub fn verification_schemes() -> Vec<String> {
    vec!["secp256k1".into()]
}

// =============================================================================
// VERIFIER
// =============================================================================

/// Stateless secp256k1 signature verifier.
#[derive(Debug, Clone, Default)]
pub struct Secp256k1Verifier;

impl Secp256k1Verifier {
    /// Create a new verifier.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Verify `signature` over `digest` against `public_key`.
    ///
    /// Fail-closed: malformed signatures, wrong-length keys, and genuine
    /// verification failures all return `false`. The caller decides whether
    /// `false` is fatal.
    #[must_use]
    pub fn verify(&self, digest: &Hash, signature: &[u8], public_key: &[u8]) -> bool {
        match self.try_verify(digest, signature, public_key) {
            Ok(verifies) => verifies,
            Err(err) => {
                tracing::debug!(%err, "rejecting structurally invalid signature input");
                false
            }
        }
    }

    /// Fallible inner verification path.
    ///
    /// `Err` means the inputs were structurally invalid; `Ok(false)` means
    /// well-formed inputs that do not verify.
    pub fn try_verify(
        &self,
        digest: &Hash,
        signature: &[u8],
        public_key: &[u8],
    ) -> Result<bool, CryptoError> {
        let key = parse_public_key(public_key)?;
        let sig = parse_signature(signature)?;

        let prehash = Sha256::digest(digest);
        Ok(key.verify_prehash(&prehash, &sig).is_ok())
    }

    /// Check that `public_key` is a well-formed SEC1 secp256k1 point.
    ///
    /// Used to sanitize keys before they are installed as the gateway
    /// owner's key.
    #[must_use]
    pub fn validate_public_key(&self, public_key: &[u8]) -> bool {
        parse_public_key(public_key).is_ok()
    }
}

// =============================================================================
// PARSING HELPERS
// =============================================================================

fn parse_public_key(public_key: &[u8]) -> Result<VerifyingKey, CryptoError> {
    if public_key.len() != COMPRESSED_PUBKEY_LEN && public_key.len() != UNCOMPRESSED_PUBKEY_LEN {
        return Err(CryptoError::InvalidPublicKey);
    }
    VerifyingKey::from_sec1_bytes(public_key).map_err(|_| CryptoError::InvalidPublicKey)
}

fn parse_signature(signature: &[u8]) -> Result<Signature, CryptoError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(CryptoError::InvalidSignatureLength(signature.len()));
    }

    let mut s_bytes = [0u8; 32];
    s_bytes.copy_from_slice(&signature[32..]);
    let low_s = is_low_s(&s_bytes);
    s_bytes.zeroize();
    if !low_s {
        return Err(CryptoError::MalleableSignature);
    }

    Signature::from_slice(signature).map_err(|_| CryptoError::InvalidSignature)
}

/// Constant-time strict `a < b` over 32-byte big-endian values.
fn ct_lt(a: &[u8; 32], b: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let not_decided = !(less | greater);
        let byte_less = Choice::from((a[i] < b[i]) as u8);
        let byte_greater = Choice::from((a[i] > b[i]) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

/// S must be strictly below half the curve order.
fn is_low_s(s: &[u8; 32]) -> bool {
    ct_lt(s, &SECP256K1_HALF_ORDER)
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    //! Signing-side helpers for tests; production code only ever verifies.

    use super::*;
    use k256::ecdsa::signature::hazmat::PrehashSigner;
    use k256::ecdsa::SigningKey;
    use k256::elliptic_curve::sec1::ToEncodedPoint;

    /// Generate a fresh secp256k1 keypair.
    #[must_use]
    pub fn generate_keypair() -> (SigningKey, VerifyingKey) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let verifying_key = *signing_key.verifying_key();
        (signing_key, verifying_key)
    }

    /// SEC1-encode a verifying key.
    #[must_use]
    pub fn encode_public_key(key: &VerifyingKey, compressed: bool) -> Vec<u8> {
        key.to_encoded_point(compressed).as_bytes().to_vec()
    }

    /// Sign an authorization digest the way a gateway owner would:
    /// ECDSA over `SHA-256(digest)`, normalized to low S.
    #[must_use]
    pub fn sign_digest(digest: &Hash, key: &SigningKey) -> Vec<u8> {
        let prehash = Sha256::digest(digest);
        let sig: Signature = key.sign_prehash(&prehash).expect("signing failed");
        let sig = sig.normalize_s().unwrap_or(sig);
        sig.to_bytes().to_vec()
    }

    /// Flip S into the high half of the curve order: s' = n - s.
    ///
    /// Produces the malleable twin of a valid signature.
    #[must_use]
    pub fn raise_s(signature: &[u8]) -> Vec<u8> {
        // secp256k1 curve order n
        const SECP256K1_ORDER: [u8; 32] = [
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
            0xFF, 0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C,
            0xD0, 0x36, 0x41, 0x41,
        ];

        let mut out = signature.to_vec();
        let mut borrow: i32 = 0;
        for i in (0..32).rev() {
            let diff = i32::from(SECP256K1_ORDER[i]) - i32::from(signature[32 + i]) - borrow;
            if diff < 0 {
                out[32 + i] = (diff + 256) as u8;
                borrow = 1;
            } else {
                out[32 + i] = diff as u8;
                borrow = 0;
            }
        }
        out
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================
