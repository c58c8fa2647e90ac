//! # Crypto Helper Adapter
//!
//! Implements the [`SignatureVerifier`] port over `gateway-crypto`'s
//! secp256k1 verifier. In a deployed system this boundary is a query to a
//! separate crypto-verification contract; the adapter keeps that contract's
//! address so the gateway can report it, while the curve math runs in
//! process.

use crate::ports::outbound::SignatureVerifier;
use gateway_crypto::Secp256k1Verifier;
use gateway_types::{Address, Hash};

/// Signature verification via the crypto helper resource.
#[derive(Debug, Clone)]
pub struct CryptoHelperAdapter {
    helper: Address,
    verifier: Secp256k1Verifier,
}

impl CryptoHelperAdapter {
    /// Adapter bound to the helper contract at `helper`.
    #[must_use]
    pub fn new(helper: Address) -> Self {
        Self {
            helper,
            verifier: Secp256k1Verifier::new(),
        }
    }

    /// Address of the helper resource this adapter fronts.
    #[must_use]
    pub fn helper_address(&self) -> Address {
        self.helper
    }
}

impl SignatureVerifier for CryptoHelperAdapter {
    fn verify(&self, digest: &Hash, signature: &[u8], public_key: &[u8]) -> bool {
        self.verifier.verify(digest, signature, public_key)
    }

    fn validate_public_key(&self, public_key: &[u8]) -> bool {
        self.verifier.validate_public_key(public_key)
    }
}
