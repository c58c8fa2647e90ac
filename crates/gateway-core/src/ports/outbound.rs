//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the dispatcher depends on. Adapters implement these traits to
//! provide:
//! - Signature verification (the crypto helper resource)
//! - Sub-message execution against downstream resources
//!
//! Dependencies point inward: the service only ever sees these traits.

use crate::domain::entities::{ExecutionOutcome, SubMessage};
use crate::domain::errors::ProgramError;
use async_trait::async_trait;
use gateway_types::{Address, Hash};
use thiserror::Error;

// =============================================================================
// SIGNATURE VERIFIER (crypto helper dependency)
// =============================================================================

/// Interface to the crypto-verification helper.
///
/// Verification is binary and fail-closed: malformed input is `false`, never
/// an error the dispatcher could mistake for a transport failure.
pub trait SignatureVerifier: Send + Sync {
    /// Check `signature` over `digest` against `public_key`.
    fn verify(&self, digest: &Hash, signature: &[u8], public_key: &[u8]) -> bool;

    /// Structural sanity check for a public key about to be installed.
    fn validate_public_key(&self, public_key: &[u8]) -> bool;
}

// =============================================================================
// RESOURCE EXECUTOR (downstream dispatch dependency)
// =============================================================================

/// Identifier of a point-in-time executor snapshot.
pub type SnapshotId = u64;

/// Failures from downstream sub-message dispatch.
///
/// A distinct channel from authorization failures: the dispatcher wraps
/// these in `SubMessageFailed` rather than conflating them with
/// `Unauthorized`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExecutorError {
    /// No code uploaded under this id.
    #[error("unknown code id: {0}")]
    UnknownCodeId(u64),

    /// No contract at this address.
    #[error("no contract at {0}")]
    ContractNotFound(Address),

    /// Recursive follow-up dispatch exceeded the depth limit.
    #[error("call depth exceeded: {depth} > {max}")]
    CallDepthExceeded {
        /// Depth the dispatch reached.
        depth: u32,
        /// Configured maximum.
        max: u32,
    },

    /// The target program rejected the call.
    #[error("program error: {0}")]
    Program(#[from] ProgramError),
}

/// Interface for executing sub-messages against managed resources.
///
/// The snapshot operations give the dispatcher its all-or-nothing batch
/// semantics: `checkpoint` before the first dispatch, then either `commit`
/// or `rollback`; a rolled-back batch leaves no observable effects.
#[async_trait]
pub trait ResourceExecutor: Send + Sync {
    /// Record the current resource state and return a handle to it.
    async fn checkpoint(&self) -> SnapshotId;

    /// Dispatch one sub-message with `origin` as its sender.
    async fn dispatch(
        &self,
        origin: Address,
        message: &SubMessage,
    ) -> Result<ExecutionOutcome, ExecutorError>;

    /// Discard everything dispatched since `snapshot` was taken.
    async fn rollback(&self, snapshot: SnapshotId);

    /// Make everything since `snapshot` permanent and drop the snapshot.
    async fn commit(&self, snapshot: SnapshotId);
}
