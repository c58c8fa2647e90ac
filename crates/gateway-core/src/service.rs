//! # Gateway Service
//!
//! The dispatcher state machine: the two entry points (direct, signed) that
//! tie the canonical encoder, nonce store, signature verifier, registry, and
//! resource executor together.
//!
//! ## Submission window
//!
//! Each submission moves `Idle → Authorizing → Executing → Idle`; no
//! intermediate state survives a call. The whole window runs under one
//! per-instance mutex, so at most one batch is authorizing or executing at a
//! time. The nonce store stays independently race-safe underneath: even a
//! caller that bypassed the mutex could not double-consume a nonce.
//!
//! ## Nonce semantics
//!
//! Nonce consumption is tied to *authorization*, not execution outcome. A
//! signed batch that verifies and then aborts mid-execution has still spent
//! its nonce and cannot be resubmitted verbatim; the owner signs the
//! corrected batch against the next nonce. Failed verification consumes
//! nothing, so garbage submissions cannot starve the owner out of sequence
//! slots.

use crate::domain::codec;
use crate::domain::entities::{
    Batch, BatchReceipt, ExecutionOutcome, GatewayConfig, GatewayInfo, RegisterSource,
};
use crate::domain::errors::GatewayError;
use crate::domain::nonce::NonceStore;
use crate::domain::registry::Registry;
use crate::ports::inbound::GatewayApi;
use crate::ports::outbound::{ResourceExecutor, SignatureVerifier};

use async_trait::async_trait;
use gateway_crypto::authorization_digest;
use gateway_types::Address;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

// =============================================================================
// CONFIGURATION & STATS
// =============================================================================

/// Dispatcher tuning, passed to the constructor.
///
/// Verbosity lives here rather than in ambient global flags.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Maximum sub-messages accepted per batch.
    pub max_batch_messages: usize,
    /// Emit a debug event per dispatched sub-message.
    pub trace_submessages: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            max_batch_messages: 64,
            trace_submessages: false,
        }
    }
}

/// Counters for a gateway instance.
#[derive(Debug, Default, Clone)]
pub struct GatewayStats {
    /// Batches committed through the direct path.
    pub direct_batches: u64,
    /// Batches committed through the signed path.
    pub signed_batches: u64,
    /// Submissions rejected before execution (bad caller, bad signature,
    /// frozen gateway).
    pub rejected_submissions: u64,
    /// Batches that started executing and were rolled back.
    pub aborted_batches: u64,
    /// Sub-messages dispatched inside committed batches.
    pub submessages_dispatched: u64,
    /// Names committed to the registry.
    pub names_registered: u64,
}

// =============================================================================
// SERVICE
// =============================================================================

/// The gateway proxy: owns the nonce, the registry, and the configuration,
/// and executes batches under its own identity.
pub struct GatewayService {
    dispatcher: DispatcherConfig,
    state: RwLock<GatewayConfig>,
    nonce: NonceStore,
    registry: Registry,
    verifier: Arc<dyn SignatureVerifier>,
    executor: Arc<dyn ResourceExecutor>,
    /// Serializes the Authorizing/Executing window.
    submission: Mutex<()>,
    stats: RwLock<GatewayStats>,
}

impl GatewayService {
    /// Create a gateway. Rejects a structurally invalid owner public key up
    /// front rather than leaving the signed path permanently dead.
    pub fn new(
        config: GatewayConfig,
        verifier: Arc<dyn SignatureVerifier>,
        executor: Arc<dyn ResourceExecutor>,
        dispatcher: DispatcherConfig,
    ) -> Result<Self, GatewayError> {
        if !verifier.validate_public_key(&config.public_key) {
            return Err(GatewayError::InvalidPublicKey);
        }
        Ok(Self {
            dispatcher,
            state: RwLock::new(config),
            nonce: NonceStore::new(),
            registry: Registry::new(),
            verifier,
            executor,
            submission: Mutex::new(()),
            stats: RwLock::new(GatewayStats::default()),
        })
    }

    /// Current counters.
    pub async fn stats(&self) -> GatewayStats {
        self.stats.read().await.clone()
    }

    async fn reject(&self) {
        self.stats.write().await.rejected_submissions += 1;
    }

    /// Execute every sub-message in order and commit registrations, or roll
    /// everything back. Runs inside the submission window; on the signed
    /// path the nonce has already been consumed by the time this runs.
    async fn run_batch(
        &self,
        gateway: Address,
        batch: &Batch,
        consumed_nonce: Option<u64>,
        correlation_id: Uuid,
    ) -> Result<BatchReceipt, GatewayError> {
        if batch.messages.len() > self.dispatcher.max_batch_messages {
            self.reject().await;
            return Err(GatewayError::BatchTooLarge {
                len: batch.messages.len(),
                max: self.dispatcher.max_batch_messages,
            });
        }
        self.precheck_registrations(batch)?;

        let snapshot = self.executor.checkpoint().await;
        let mut outcomes = Vec::with_capacity(batch.messages.len());

        for (index, message) in batch.messages.iter().enumerate() {
            if self.dispatcher.trace_submessages {
                debug!(%correlation_id, index, "dispatching sub-message");
            }
            match self.executor.dispatch(gateway, message).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(cause) => {
                    self.executor.rollback(snapshot).await;
                    self.stats.write().await.aborted_batches += 1;
                    warn!(%correlation_id, index, %cause, "batch aborted, effects rolled back");
                    return Err(GatewayError::SubMessageFailed { index, cause });
                }
            }
        }

        let pairs = match Self::resolve_registrations(batch, &outcomes) {
            Ok(pairs) => pairs,
            Err(err) => {
                self.executor.rollback(snapshot).await;
                self.stats.write().await.aborted_batches += 1;
                return Err(err);
            }
        };
        if let Err(err) = self.registry.register_all(&pairs) {
            self.executor.rollback(snapshot).await;
            self.stats.write().await.aborted_batches += 1;
            return Err(err.into());
        }

        self.executor.commit(snapshot).await;
        {
            let mut stats = self.stats.write().await;
            stats.submessages_dispatched += outcomes.len() as u64;
            stats.names_registered += pairs.len() as u64;
        }

        Ok(BatchReceipt {
            correlation_id,
            consumed_nonce,
            outcomes,
            registered: pairs,
        })
    }

    /// Cheap structural checks before any sub-message runs: taken names and
    /// out-of-range indices fail the batch without touching the executor.
    fn precheck_registrations(&self, batch: &Batch) -> Result<(), GatewayError> {
        for (index, request) in batch.register.iter().enumerate() {
            if self.registry.contains(&request.name) {
                return Err(GatewayError::NameAlreadyRegistered(request.name.clone()));
            }
            if let RegisterSource::MessageIndex(i) = request.source {
                if i as usize >= batch.messages.len() {
                    return Err(GatewayError::UnresolvableRegister { index });
                }
            }
        }
        Ok(())
    }

    fn resolve_registrations(
        batch: &Batch,
        outcomes: &[ExecutionOutcome],
    ) -> Result<Vec<(String, Address)>, GatewayError> {
        let mut pairs = Vec::with_capacity(batch.register.len());
        for (index, request) in batch.register.iter().enumerate() {
            let address = match request.source {
                RegisterSource::Address(address) => address,
                RegisterSource::MessageIndex(i) => outcomes
                    .get(i as usize)
                    .and_then(|outcome| outcome.address)
                    .ok_or(GatewayError::UnresolvableRegister { index })?,
            };
            pairs.push((request.name.clone(), address));
        }
        Ok(pairs)
    }
}

// =============================================================================
// INBOUND API
// =============================================================================

#[async_trait]
impl GatewayApi for GatewayService {
    #[instrument(skip(self, batch), fields(messages = batch.messages.len()))]
    async fn execute_direct(
        &self,
        caller: Address,
        batch: Batch,
    ) -> Result<BatchReceipt, GatewayError> {
        let correlation_id = Uuid::new_v4();
        let _window = self.submission.lock().await;

        let cfg = self.state.read().await.clone();
        if caller != cfg.owner {
            warn!(%correlation_id, %caller, "direct submission from non-owner rejected");
            self.reject().await;
            return Err(GatewayError::Unauthorized);
        }

        let receipt = self
            .run_batch(cfg.gateway, &batch, None, correlation_id)
            .await?;
        self.stats.write().await.direct_batches += 1;
        info!(%correlation_id, registered = receipt.registered.len(), "direct batch committed");
        Ok(receipt)
    }

    #[instrument(skip(self, batch, signature), fields(messages = batch.messages.len()))]
    async fn execute_signed(
        &self,
        batch: Batch,
        signature: &[u8],
    ) -> Result<BatchReceipt, GatewayError> {
        let correlation_id = Uuid::new_v4();
        let _window = self.submission.lock().await;

        let cfg = self.state.read().await.clone();
        if !cfg.mutable {
            self.reject().await;
            return Err(GatewayError::Frozen);
        }

        let observed = self.nonce.current();
        let encoded = codec::encode_batch(&batch.messages)?;
        let digest = authorization_digest(&encoded, observed);

        if !self.verifier.verify(&digest, signature, &cfg.public_key) {
            // Failed attempts must not burn a sequence slot.
            warn!(%correlation_id, nonce = observed, "signed submission failed verification");
            self.reject().await;
            return Err(GatewayError::Unauthorized);
        }

        let consumed = self.nonce.advance_from(observed)?;
        // The nonce is spent from this point on; a mid-batch abort does not
        // refund it.
        let receipt = self
            .run_batch(cfg.gateway, &batch, Some(consumed), correlation_id)
            .await?;
        self.stats.write().await.signed_batches += 1;
        info!(%correlation_id, nonce = consumed, "signed batch committed");
        Ok(receipt)
    }

    async fn can_send(&self, batch: &Batch, signature: &[u8]) -> Result<bool, GatewayError> {
        let cfg = self.state.read().await.clone();
        if !cfg.mutable {
            return Ok(false);
        }
        let encoded = codec::encode_batch(&batch.messages)?;
        let digest = authorization_digest(&encoded, self.nonce.current());
        Ok(self.verifier.verify(&digest, signature, &cfg.public_key))
    }

    async fn resolve(&self, name: &str) -> Result<Address, GatewayError> {
        Ok(self.registry.resolve(name)?)
    }

    async fn current_nonce(&self) -> u64 {
        self.nonce.current()
    }

    async fn info(&self) -> GatewayInfo {
        let cfg = self.state.read().await.clone();
        GatewayInfo {
            gateway: cfg.gateway,
            owner: cfg.owner,
            public_key: cfg.public_key,
            crypto_helper: cfg.crypto_helper,
            nonce: self.nonce.current(),
            mutable: cfg.mutable,
        }
    }

    #[instrument(skip(self, new_public_key))]
    async fn update_owner(
        &self,
        caller: Address,
        new_owner: Address,
        new_public_key: Vec<u8>,
    ) -> Result<(), GatewayError> {
        let _window = self.submission.lock().await;
        let mut state = self.state.write().await;

        if caller != state.owner {
            self.reject().await;
            return Err(GatewayError::Unauthorized);
        }
        if !state.mutable {
            self.reject().await;
            return Err(GatewayError::Frozen);
        }
        if !self.verifier.validate_public_key(&new_public_key) {
            return Err(GatewayError::InvalidPublicKey);
        }

        state.owner = new_owner;
        state.public_key = new_public_key;
        // Fresh owner, fresh sequence. Re-installing a previous owner makes
        // that owner's old signatures verifiable again; per-owner nonce
        // history is out of scope.
        self.nonce.reset();
        info!(%new_owner, "owner rotated, nonce reset");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn freeze(&self, caller: Address) -> Result<(), GatewayError> {
        let _window = self.submission.lock().await;
        let mut state = self.state.write().await;

        if caller != state.owner {
            self.reject().await;
            return Err(GatewayError::Unauthorized);
        }
        if !state.mutable {
            self.reject().await;
            return Err(GatewayError::Frozen);
        }

        state.mutable = false;
        info!("gateway frozen");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
