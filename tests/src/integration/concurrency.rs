//! # Concurrency Integration Tests
//!
//! The gateway's authoritative state (nonce, registry) is one shared
//! resource: concurrent signed submissions must serialize, exactly one may
//! consume a given nonce, and losers must fail loudly rather than corrupt
//! state.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gateway_core::adapters::{CryptoHelperAdapter, InMemoryLedger};
    use gateway_core::{
        encode_batch, Batch, DispatcherConfig, GatewayApi, GatewayConfig, GatewayError,
        GatewayService, ResourceExecutor, SubMessage,
    };
    use gateway_crypto::authorization_digest;
    use gateway_crypto::test_helpers::{encode_public_key, generate_keypair, sign_digest};
    use gateway_types::Address;
    use k256::ecdsa::SigningKey;
    use serde_json::json;
    use token_factory::FactoryProgram;

    const FACTORY_CODE_ID: u64 = 7;
    const OWNER: Address = Address(*b"axelar-owner--------");
    const GATEWAY: Address = Address(*b"gateway-proxy-------");
    const HELPER: Address = Address(*b"crypto-helper-------");

    fn shared_gateway() -> (Arc<GatewayService>, SigningKey) {
        crate::init_tracing();
        let (signing_key, verifying_key) = generate_keypair();
        let ledger: Arc<dyn ResourceExecutor> = Arc::new(
            InMemoryLedger::new().with_program(FACTORY_CODE_ID, Arc::new(FactoryProgram::new())),
        );
        let gateway = GatewayService::new(
            GatewayConfig {
                gateway: GATEWAY,
                owner: OWNER,
                public_key: encode_public_key(&verifying_key, true),
                crypto_helper: HELPER,
                mutable: true,
            },
            Arc::new(CryptoHelperAdapter::new(HELPER)),
            ledger,
            DispatcherConfig::default(),
        )
        .expect("valid gateway config");
        (Arc::new(gateway), signing_key)
    }

    fn instantiate_batch(label: &str) -> Batch {
        Batch::new(vec![SubMessage::Instantiate {
            code_id: FACTORY_CODE_ID,
            label: Some(label.into()),
            payload: json!({"token_code_id": 8}),
        }])
    }

    fn sign(batch: &Batch, nonce: u64, key: &SigningKey) -> Vec<u8> {
        let encoded = encode_batch(&batch.messages).expect("encodable batch");
        sign_digest(&authorization_digest(&encoded, nonce), key)
    }

    /// Many relayers race distinct batches all signed against nonce 0: the
    /// serialized submission window lets exactly one through, and every
    /// loser's stale signature fails verification against the new nonce.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn racing_signed_submissions_admit_exactly_one() {
        let (gateway, key) = shared_gateway();

        let mut handles = Vec::new();
        for i in 0..8 {
            let gateway = Arc::clone(&gateway);
            let batch = instantiate_batch(&format!("contender-{i}"));
            let sig = sign(&batch, 0, &key);
            handles.push(tokio::spawn(async move {
                gateway.execute_signed(batch, &sig).await
            }));
        }

        let mut accepted = 0;
        let mut unauthorized = 0;
        for handle in handles {
            match handle.await.expect("submission task") {
                Ok(receipt) => {
                    assert_eq!(receipt.consumed_nonce, Some(0));
                    accepted += 1;
                }
                Err(GatewayError::Unauthorized | GatewayError::NonceConflict { .. }) => {
                    unauthorized += 1;
                }
                Err(other) => panic!("unexpected failure: {other}"),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(unauthorized, 7);
        assert_eq!(gateway.current_nonce().await, 1);
    }

    /// N accepted signed batches move the nonce from 0 to exactly N, with
    /// every failed-verification attempt in between changing nothing.
    #[tokio::test]
    async fn nonce_is_monotonic_and_gapless_across_submissions() {
        let (gateway, key) = shared_gateway();
        const ROUNDS: u64 = 5;

        for round in 0..ROUNDS {
            // A stale or garbage attempt before each accepted batch.
            let stale = instantiate_batch("stale");
            let stale_sig = sign(&stale, round.wrapping_sub(1), &key);
            assert!(gateway.execute_signed(stale, &stale_sig).await.is_err());
            assert_eq!(gateway.current_nonce().await, round);

            let batch = instantiate_batch(&format!("round-{round}"));
            let sig = sign(&batch, round, &key);
            let receipt = gateway.execute_signed(batch, &sig).await.unwrap();
            assert_eq!(receipt.consumed_nonce, Some(round));
            assert_eq!(gateway.current_nonce().await, round + 1);
        }

        let stats = gateway.stats().await;
        assert_eq!(stats.signed_batches, ROUNDS);
        assert_eq!(stats.rejected_submissions, ROUNDS);
    }

    /// Direct and signed traffic interleaving: direct batches slide through
    /// the same submission window without ever touching the sequence.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn direct_traffic_does_not_perturb_the_sequence() {
        let (gateway, key) = shared_gateway();

        let mut handles = Vec::new();
        for i in 0..6 {
            let gateway = Arc::clone(&gateway);
            let batch = instantiate_batch(&format!("direct-{i}"));
            handles.push(tokio::spawn(async move {
                gateway.execute_direct(OWNER, batch).await
            }));
        }
        for handle in handles {
            handle.await.expect("task").expect("owner direct batch");
        }

        assert_eq!(gateway.current_nonce().await, 0);

        // The signature prepared against nonce 0 is still live afterwards.
        let batch = instantiate_batch("post-direct");
        let sig = sign(&batch, 0, &key);
        assert!(gateway.execute_signed(batch, &sig).await.is_ok());
        assert_eq!(gateway.current_nonce().await, 1);
    }
}
