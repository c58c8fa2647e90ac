//! # Inbound Ports (Driving Ports / API)
//!
//! The gateway's public operations. The transport layer in front of this
//! trait has already authenticated the caller identity it passes in; the
//! gateway itself never authenticates connections.

use crate::domain::entities::{Batch, BatchReceipt, GatewayInfo};
use crate::domain::errors::GatewayError;
use async_trait::async_trait;
use gateway_types::Address;

/// Primary Gateway API.
///
/// Implementations must be thread-safe (`Send + Sync`); concurrent
/// submissions serialize internally.
#[async_trait]
pub trait GatewayApi: Send + Sync {
    /// Execute a batch submitted directly by the owner.
    ///
    /// Fails with [`GatewayError::Unauthorized`] if `caller` is not the
    /// configured owner. Never reads or advances the nonce.
    async fn execute_direct(
        &self,
        caller: Address,
        batch: Batch,
    ) -> Result<BatchReceipt, GatewayError>;

    /// Execute a batch submitted by anyone, authorized by the owner's
    /// signature over the authorization digest at the current nonce.
    ///
    /// On verification failure the nonce is untouched; on success it is
    /// consumed exactly once, before execution begins.
    async fn execute_signed(
        &self,
        batch: Batch,
        signature: &[u8],
    ) -> Result<BatchReceipt, GatewayError>;

    /// Dry-run the signed-path authorization against the current nonce.
    ///
    /// If this returns `true` then an `execute_signed` with the same batch
    /// and signature, before any further state change, would authorize.
    async fn can_send(&self, batch: &Batch, signature: &[u8]) -> Result<bool, GatewayError>;

    /// Resolve a registered logical name.
    async fn resolve(&self, name: &str) -> Result<Address, GatewayError>;

    /// The current (next unconsumed) nonce, for relayers constructing the
    /// next signature.
    async fn current_nonce(&self) -> u64;

    /// Configuration and live nonce, in one consistent view.
    async fn info(&self) -> GatewayInfo;

    /// Rotate the owner identity and public key. Owner-only; resets the
    /// nonce to 0.
    async fn update_owner(
        &self,
        caller: Address,
        new_owner: Address,
        new_public_key: Vec<u8>,
    ) -> Result<(), GatewayError>;

    /// Permanently disable the signed path and configuration changes.
    /// Owner-only, one-way.
    async fn freeze(&self, caller: Address) -> Result<(), GatewayError>;
}
