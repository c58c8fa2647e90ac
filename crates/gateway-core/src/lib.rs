//! # Gateway Core
//!
//! The relay/registry protocol behind the Wasm-Gateway: a single proxy
//! identity that executes batches of sub-messages against managed resources
//! on behalf of an owner.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): pure protocol logic: canonical batch
//!   encoding, the nonce store, the write-once registry, entities, errors.
//! - **Ports Layer** (`ports/`): trait definitions for the inbound gateway
//!   API and the outbound signature-verifier and resource-executor
//!   dependencies.
//! - **Service Layer** (`service.rs`): the dispatcher state machine wiring
//!   domain logic to the ports.
//! - **Adapters** (`adapters/`): the crypto-helper verifier and an in-memory
//!   ledger executor hosting resource programs.
//!
//! ## Authorization paths
//!
//! - **Direct**: the owner calls in as themselves; no nonce involved.
//! - **Signed**: anyone may submit, carrying the owner's signature over
//!   `Keccak256(canonical_batch || nonce_be)`. Each accepted signed batch
//!   consumes exactly one nonce; failed verification consumes nothing.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use domain::codec::encode_batch;
pub use domain::entities::{
    Batch, BatchReceipt, ExecutionOutcome, GatewayConfig, GatewayInfo, RegisterRequest,
    RegisterSource, SubMessage,
};
pub use domain::errors::{EncodingError, GatewayError, NonceError, ProgramError, RegistryError};
pub use domain::nonce::NonceStore;
pub use domain::registry::Registry;
pub use ports::inbound::GatewayApi;
pub use ports::outbound::{ExecutorError, ResourceExecutor, SignatureVerifier, SnapshotId};
pub use service::{DispatcherConfig, GatewayService, GatewayStats};
