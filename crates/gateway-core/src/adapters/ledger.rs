//! # In-Memory Ledger
//!
//! A [`ResourceExecutor`] implementation hosting resource programs in
//! process. Production deployments dispatch into the ledger's wasm runtime;
//! this adapter provides the same contract surface for tests and local
//! composition.
//!
//! Programs are registered under a code id and instantiated into addressed
//! contract cells holding JSON state. A program call may return follow-up
//! sub-messages, which the ledger dispatches recursively with the calling
//! contract as sender. This is the init-hook pattern downstream resources use to
//! call back into their deployer.
//!
//! Snapshots clone the whole contract table; `rollback` restores it, which
//! is what gives a batch its all-or-nothing semantics.

use crate::domain::entities::{ExecutionOutcome, SubMessage};
use crate::domain::errors::ProgramError;
use crate::ports::outbound::{ExecutorError, ResourceExecutor, SnapshotId};
use async_trait::async_trait;
use gateway_types::Address;
use serde_json::Value;
use sha3::{Digest, Keccak256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::debug;

/// Maximum recursive follow-up dispatch depth.
const MAX_CALL_DEPTH: u32 = 8;

// =============================================================================
// PROGRAM INTERFACE
// =============================================================================

/// Identity context for a program call.
#[derive(Clone, Copy, Debug)]
pub struct CallContext {
    /// Who invoked this call (the gateway, or the calling contract for
    /// follow-up messages).
    pub sender: Address,
    /// The contract being called.
    pub contract: Address,
}

/// What a program call produced: its updated state, any follow-up messages
/// to dispatch as this contract, and opaque response data.
#[derive(Clone, Debug, Default)]
pub struct ProgramResponse {
    /// Post-call contract state.
    pub state: Value,
    /// Messages to dispatch with this contract as sender.
    pub messages: Vec<SubMessage>,
    /// Response data handed back to the caller.
    pub data: Option<Value>,
}

impl ProgramResponse {
    /// A response that only updates state.
    #[must_use]
    pub fn state_only(state: Value) -> Self {
        Self {
            state,
            messages: Vec::new(),
            data: None,
        }
    }
}

/// A resource program: the logic behind one code id.
pub trait Program: Send + Sync {
    /// Initialize a fresh contract instance.
    fn instantiate(&self, ctx: &CallContext, payload: &Value)
        -> Result<ProgramResponse, ProgramError>;

    /// Handle a call against existing state.
    fn execute(
        &self,
        ctx: &CallContext,
        state: &Value,
        payload: &Value,
    ) -> Result<ProgramResponse, ProgramError>;

    /// Answer a read-only query.
    fn query(&self, ctx: &CallContext, state: &Value, payload: &Value)
        -> Result<Value, ProgramError>;
}

// =============================================================================
// LEDGER
// =============================================================================

#[derive(Clone, Debug)]
struct ContractCell {
    code_id: u64,
    state: Value,
}

/// In-memory contract host implementing [`ResourceExecutor`].
#[derive(Default)]
pub struct InMemoryLedger {
    programs: RwLock<HashMap<u64, Arc<dyn Program>>>,
    contracts: RwLock<HashMap<Address, ContractCell>>,
    snapshots: RwLock<HashMap<SnapshotId, HashMap<Address, ContractCell>>>,
    instance_seq: AtomicU64,
    snapshot_seq: AtomicU64,
}

impl InMemoryLedger {
    /// An empty ledger with no programs installed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a program under `code_id`, builder style.
    #[must_use]
    pub fn with_program(self, code_id: u64, program: Arc<dyn Program>) -> Self {
        self.programs.write().unwrap().insert(code_id, program);
        self
    }

    /// Current state of the contract at `address`, if any.
    #[must_use]
    pub fn contract_state(&self, address: Address) -> Option<Value> {
        self.contracts
            .read()
            .unwrap()
            .get(&address)
            .map(|cell| cell.state.clone())
    }

    /// Whether a contract exists at `address`.
    #[must_use]
    pub fn contains(&self, address: Address) -> bool {
        self.contracts.read().unwrap().contains_key(&address)
    }

    /// Run a read-only query outside any batch.
    pub fn query(&self, contract: Address, payload: &Value) -> Result<Value, ExecutorError> {
        let (program, state) = self.load(contract)?;
        let ctx = CallContext {
            sender: contract,
            contract,
        };
        Ok(program.query(&ctx, &state, payload)?)
    }

    /// Deterministic address for the next instance of `code_id`: the last
    /// 20 bytes of `Keccak256(code_id_be || seq_be)`.
    fn next_address(&self, code_id: u64) -> Address {
        let seq = self.instance_seq.fetch_add(1, Ordering::SeqCst);
        let mut hasher = Keccak256::new();
        hasher.update(code_id.to_be_bytes());
        hasher.update(seq.to_be_bytes());
        let hash = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash[12..]);
        Address::new(bytes)
    }

    fn load(&self, contract: Address) -> Result<(Arc<dyn Program>, Value), ExecutorError> {
        let contracts = self.contracts.read().unwrap();
        let cell = contracts
            .get(&contract)
            .ok_or(ExecutorError::ContractNotFound(contract))?;
        let program = self
            .programs
            .read()
            .unwrap()
            .get(&cell.code_id)
            .cloned()
            .ok_or(ExecutorError::UnknownCodeId(cell.code_id))?;
        Ok((program, cell.state.clone()))
    }

    fn dispatch_inner(
        &self,
        origin: Address,
        message: &SubMessage,
        depth: u32,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        if depth > MAX_CALL_DEPTH {
            return Err(ExecutorError::CallDepthExceeded {
                depth,
                max: MAX_CALL_DEPTH,
            });
        }

        match message {
            SubMessage::Instantiate {
                code_id, payload, ..
            } => {
                let program = self
                    .programs
                    .read()
                    .unwrap()
                    .get(code_id)
                    .cloned()
                    .ok_or(ExecutorError::UnknownCodeId(*code_id))?;

                let address = self.next_address(*code_id);
                let ctx = CallContext {
                    sender: origin,
                    contract: address,
                };
                let response = program.instantiate(&ctx, payload)?;
                self.contracts.write().unwrap().insert(
                    address,
                    ContractCell {
                        code_id: *code_id,
                        state: response.state,
                    },
                );
                debug!(code_id, %address, "contract instantiated");

                self.run_followups(address, &response.messages, depth)?;
                Ok(ExecutionOutcome {
                    address: Some(address),
                    data: response.data,
                })
            }
            SubMessage::Execute { contract, payload } => {
                let (program, state) = self.load(*contract)?;
                let ctx = CallContext {
                    sender: origin,
                    contract: *contract,
                };
                let response = program.execute(&ctx, &state, payload)?;
                if let Some(cell) = self.contracts.write().unwrap().get_mut(contract) {
                    cell.state = response.state;
                }

                self.run_followups(*contract, &response.messages, depth)?;
                Ok(ExecutionOutcome {
                    address: None,
                    data: response.data,
                })
            }
            SubMessage::Query { contract, payload } => {
                let (program, state) = self.load(*contract)?;
                let ctx = CallContext {
                    sender: origin,
                    contract: *contract,
                };
                let data = program.query(&ctx, &state, payload)?;
                Ok(ExecutionOutcome {
                    address: None,
                    data: Some(data),
                })
            }
        }
    }

    fn run_followups(
        &self,
        sender: Address,
        messages: &[SubMessage],
        depth: u32,
    ) -> Result<(), ExecutorError> {
        for message in messages {
            self.dispatch_inner(sender, message, depth + 1)?;
        }
        Ok(())
    }
}

#[async_trait]
impl ResourceExecutor for InMemoryLedger {
    async fn checkpoint(&self) -> SnapshotId {
        let id = self.snapshot_seq.fetch_add(1, Ordering::SeqCst);
        let snapshot = self.contracts.read().unwrap().clone();
        self.snapshots.write().unwrap().insert(id, snapshot);
        id
    }

    async fn dispatch(
        &self,
        origin: Address,
        message: &SubMessage,
    ) -> Result<ExecutionOutcome, ExecutorError> {
        self.dispatch_inner(origin, message, 0)
    }

    async fn rollback(&self, snapshot: SnapshotId) {
        if let Some(saved) = self.snapshots.write().unwrap().remove(&snapshot) {
            *self.contracts.write().unwrap() = saved;
        }
    }

    async fn commit(&self, snapshot: SnapshotId) {
        self.snapshots.write().unwrap().remove(&snapshot);
    }
}

// =============================================================================
// TESTS
// =============================================================================
