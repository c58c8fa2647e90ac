//! # Core Domain Entities
//!
//! The batch, its sub-messages, registration requests, and the gateway's
//! configuration. These are the types a relayer serializes and the owner
//! signs over, so their shapes are part of the protocol.

use gateway_types::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

// =============================================================================
// SUB-MESSAGES
// =============================================================================

/// One directive inside a batch, dispatched to a downstream resource under
/// the gateway's own identity.
///
/// A closed set with an explicit `kind` discriminant: the canonical encoder
/// matches on it exhaustively, so adding a variant is a protocol change, not
/// a runtime surprise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SubMessage {
    /// Instantiate a new contract from stored code.
    Instantiate {
        /// Identifier of the uploaded code to instantiate.
        code_id: u64,
        /// Optional human-readable label.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        label: Option<String>,
        /// JSON init payload handed to the new contract.
        payload: Value,
    },
    /// Execute a call on an existing contract.
    Execute {
        /// Target contract address.
        contract: Address,
        /// JSON handle payload.
        payload: Value,
    },
    /// Run a read-only query against an existing contract.
    Query {
        /// Target contract address.
        contract: Address,
        /// JSON query payload.
        payload: Value,
    },
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Where a [`RegisterRequest`] takes its address from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterSource {
    /// An address the caller already knows.
    Address(Address),
    /// The address produced by the batch's i-th sub-message (an
    /// `Instantiate`). Lets a batch deploy a contract and register it under
    /// a name in one atomic step.
    MessageIndex(u32),
}

/// A request to bind a logical name to an address in the gateway registry,
/// committed only if the whole batch succeeds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    /// Unique logical name; write-once.
    pub name: String,
    /// Address source.
    pub source: RegisterSource,
}

impl RegisterRequest {
    /// Register an already-known address.
    #[must_use]
    pub fn address(name: impl Into<String>, address: Address) -> Self {
        Self {
            name: name.into(),
            source: RegisterSource::Address(address),
        }
    }

    /// Register the address produced by the batch message at `index`.
    #[must_use]
    pub fn message_index(name: impl Into<String>, index: u32) -> Self {
        Self {
            name: name.into(),
            source: RegisterSource::MessageIndex(index),
        }
    }
}

// =============================================================================
// BATCH
// =============================================================================

/// An ordered, atomically-executed group of sub-messages plus the names to
/// register on success.
///
/// The owner's signature covers the canonical encoding of `messages` only;
/// `register` entries ride along unsigned, exactly like the original relay
/// protocol's register list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Sub-messages, executed in order. Ordering is significant and is
    /// preserved end-to-end.
    pub messages: Vec<SubMessage>,
    /// Names to bind once every message has executed.
    #[serde(default)]
    pub register: Vec<RegisterRequest>,
}

impl Batch {
    /// A batch with no registrations.
    #[must_use]
    pub fn new(messages: Vec<SubMessage>) -> Self {
        Self {
            messages,
            register: Vec::new(),
        }
    }

    /// Attach registration requests.
    #[must_use]
    pub fn with_register(mut self, register: Vec<RegisterRequest>) -> Self {
        self.register = register;
        self
    }
}

// =============================================================================
// EXECUTION RESULTS
// =============================================================================

/// What a single dispatched sub-message produced.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Address of a newly instantiated contract, if the message created one.
    pub address: Option<Address>,
    /// Opaque response data (query results, handler return values).
    pub data: Option<Value>,
}

/// Receipt for a fully committed batch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BatchReceipt {
    /// Correlation id assigned to this submission.
    pub correlation_id: Uuid,
    /// The nonce this batch consumed, or `None` on the direct path, which
    /// never touches the nonce.
    pub consumed_nonce: Option<u64>,
    /// Per-message outcomes, in batch order.
    pub outcomes: Vec<ExecutionOutcome>,
    /// Names committed to the registry by this batch.
    pub registered: Vec<(String, Address)>,
}

// =============================================================================
// GATEWAY CONFIGURATION
// =============================================================================

/// Initial configuration for a gateway instance.
///
/// The owner's address and public key are passed in explicitly rather than
/// taken from the instantiating caller, so a deployer can stand up a gateway
/// owned by someone else and the owner can audit the installed key.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// The gateway's own on-ledger identity; sub-messages dispatch with this
    /// as their sender.
    pub gateway: Address,
    /// Owner identity for the direct path.
    pub owner: Address,
    /// SEC1-encoded secp256k1 public key authorizing the signed path.
    pub public_key: Vec<u8>,
    /// Address of the crypto-verification helper resource.
    pub crypto_helper: Address,
    /// Cleared by `freeze`; once false, the signed path and configuration
    /// changes are permanently disabled.
    pub mutable: bool,
}

/// Read-only view of a gateway's configuration and live nonce.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayInfo {
    /// The gateway's own address.
    pub gateway: Address,
    /// Current owner identity.
    pub owner: Address,
    /// Current owner public key (SEC1 bytes).
    pub public_key: Vec<u8>,
    /// Crypto helper address.
    pub crypto_helper: Address,
    /// Current (next unconsumed) nonce.
    pub nonce: u64,
    /// Whether the gateway is still mutable.
    pub mutable: bool,
}

// =============================================================================
// TESTS
// =============================================================================
