//! # Nonce Store
//!
//! A single monotonically increasing counter per gateway instance, the
//! source of replay protection for the signed path.
//!
//! ## Invariants
//!
//! - Strictly increases by exactly 1 per successfully authorized signed
//!   batch; never decreases, never skips.
//! - Only one submission may consume a given value; losers observe
//!   [`NonceError::Conflict`] instead of silently overwriting.
//! - `u64::MAX` is a hard stop ([`NonceError::Overflow`]), never a wrap.

use crate::domain::errors::NonceError;
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic replay-protection counter.
#[derive(Debug, Default)]
pub struct NonceStore {
    counter: AtomicU64,
}

impl NonceStore {
    /// A store starting at nonce 0.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The current (next unconsumed) nonce.
    #[must_use]
    pub fn current(&self) -> u64 {
        self.counter.load(Ordering::SeqCst)
    }

    /// Consume `observed`, returning it and advancing the counter to
    /// `observed + 1`.
    ///
    /// Compare-and-swap against the caller's earlier read: if another
    /// submission got there first the counter is untouched and the caller
    /// gets [`NonceError::Conflict`] with the value actually found.
    pub fn advance_from(&self, observed: u64) -> Result<u64, NonceError> {
        if observed == u64::MAX {
            return Err(NonceError::Overflow);
        }
        self.counter
            .compare_exchange(observed, observed + 1, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|found| NonceError::Conflict {
                expected: observed,
                found,
            })?;
        Ok(observed)
    }

    /// Reset to 0. Only owner rotation calls this.
    pub(crate) fn reset(&self) {
        self.counter.store(0, Ordering::SeqCst);
    }
}

// =============================================================================
// TESTS
// =============================================================================
