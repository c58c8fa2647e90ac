//! # Error Types
//!
//! The gateway's failure taxonomy. Every failure is returned to the
//! immediate caller with enough structure (kind + index + underlying cause)
//! to decide between retry and abort; nothing is silently swallowed.

use crate::ports::outbound::ExecutorError;
use thiserror::Error;

// =============================================================================
// GATEWAY ERRORS
// =============================================================================

/// Failures surfaced by the gateway's public operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Bad signature or wrong caller. Terminal: retrying needs a new
    /// signature (or the right caller), not a resubmission.
    #[error("unauthorized")]
    Unauthorized,

    /// The gateway has been frozen; the signed path and configuration
    /// changes are permanently disabled.
    #[error("gateway is frozen")]
    Frozen,

    /// Lost the race for the current nonce. Transient: recompute the digest
    /// against the new nonce and obtain a fresh signature.
    #[error("nonce conflict: expected {expected}, found {found}")]
    NonceConflict {
        /// The nonce this submission verified against.
        expected: u64,
        /// The nonce actually in the store at consume time.
        found: u64,
    },

    /// The nonce counter reached `u64::MAX`. Treated as a fatal
    /// configuration error rather than wrapping.
    #[error("nonce counter overflow")]
    NonceOverflow,

    /// A sub-message aborted the batch. No effects of this batch persist;
    /// on the signed path the nonce is still consumed.
    #[error("sub-message {index} failed: {cause}")]
    SubMessageFailed {
        /// Zero-based index of the failing message.
        index: usize,
        /// Downstream failure.
        #[source]
        cause: ExecutorError,
    },

    /// The batch could not be canonically encoded. Caller bug; not
    /// retryable as-is.
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// A registration named an already-bound name. Names are write-once.
    #[error("name already registered: {0}")]
    NameAlreadyRegistered(String),

    /// Lookup of an unregistered name.
    #[error("no registered address for {0}")]
    NotFound(String),

    /// A registration pointed at a message index that is out of range or
    /// produced no address.
    #[error("register request {index} has no resolvable address")]
    UnresolvableRegister {
        /// Index into the batch's register list.
        index: usize,
    },

    /// The batch exceeds the configured message limit.
    #[error("batch too large: {len} messages, limit {max}")]
    BatchTooLarge {
        /// Messages in the submitted batch.
        len: usize,
        /// Configured limit.
        max: usize,
    },

    /// A public key failed sanitation (construction or rotation).
    #[error("invalid owner public key")]
    InvalidPublicKey,
}

impl From<NonceError> for GatewayError {
    fn from(err: NonceError) -> Self {
        match err {
            NonceError::Conflict { expected, found } => {
                GatewayError::NonceConflict { expected, found }
            }
            NonceError::Overflow => GatewayError::NonceOverflow,
        }
    }
}

impl From<RegistryError> for GatewayError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::NameAlreadyRegistered(name) => {
                GatewayError::NameAlreadyRegistered(name)
            }
            RegistryError::NotFound(name) => GatewayError::NotFound(name),
        }
    }
}

// =============================================================================
// ENCODING ERRORS
// =============================================================================

/// Failure to canonicalize a batch.
#[derive(Debug, Error)]
pub enum EncodingError {
    /// A sub-message payload would not serialize.
    #[error("unserializable payload in message {index}: {source}")]
    Payload {
        /// Zero-based index of the offending message.
        index: usize,
        /// Underlying serializer error.
        #[source]
        source: serde_json::Error,
    },

    /// A variable-length field exceeded the 32-bit length prefix.
    #[error("field of {len} bytes exceeds encodable length")]
    FieldTooLong {
        /// Actual byte length.
        len: usize,
    },
}

// =============================================================================
// NONCE ERRORS
// =============================================================================

/// Failure to consume a nonce.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NonceError {
    /// Another submission consumed the observed nonce first.
    #[error("nonce conflict: expected {expected}, found {found}")]
    Conflict {
        /// The value the loser observed.
        expected: u64,
        /// The value actually found.
        found: u64,
    },

    /// The counter is at `u64::MAX` and must not wrap.
    #[error("nonce counter overflow")]
    Overflow,
}

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Failure to register or resolve a logical name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is already bound; entries are write-once.
    #[error("name already registered: {0}")]
    NameAlreadyRegistered(String),

    /// The name has never been registered.
    #[error("no registered address for {0}")]
    NotFound(String),
}

// =============================================================================
// PROGRAM ERRORS
// =============================================================================

/// Failures raised by resource programs (the contracts the gateway
/// dispatches into). These surface to callers inside
/// [`GatewayError::SubMessageFailed`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProgramError {
    /// Caller is not allowed to perform this operation.
    #[error("unauthorized")]
    Unauthorized,

    /// An entity with this identifier already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// No entity with this identifier.
    #[error("not found: {0}")]
    NotFound(String),

    /// The payload did not match the program's message schema.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// A balance was too small for the requested operation.
    #[error("insufficient funds: needed {needed}, available {available}")]
    InsufficientFunds {
        /// Amount the operation required.
        needed: u128,
        /// Amount actually available.
        available: u128,
    },

    /// Minting past the token's configured cap.
    #[error("cap exceeded: cap {cap}, attempted total {attempted}")]
    CapExceeded {
        /// Configured supply cap.
        cap: u128,
        /// Total supply the mint would have produced.
        attempted: u128,
    },

    /// Any other program-defined failure.
    #[error("{0}")]
    Failure(String),
}
