//! # Relay Flow Integration Tests
//!
//! End-to-end choreography: a gateway dispatching real batches into the
//! in-memory ledger hosting the token factory and token programs.
//!
//! Flows covered:
//!
//! 1. **Signed deploy-and-register**: relayer submits the owner-signed
//!    "instantiate factory, register it by name" batch; replay of the same
//!    pair is rejected.
//! 2. **Factory choreography**: deploy a token through the gateway, let the
//!    init hook bind the symbol, mint and transfer through signed batches.
//! 3. **Atomicity**: a failing tail message rolls back every ledger and
//!    registry effect of the batch.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use gateway_core::adapters::{CryptoHelperAdapter, InMemoryLedger};
    use gateway_core::{
        encode_batch, Batch, DispatcherConfig, GatewayApi, GatewayConfig, GatewayError,
        GatewayService, RegisterRequest, ResourceExecutor, SubMessage,
    };
    use gateway_crypto::authorization_digest;
    use gateway_crypto::test_helpers::{encode_public_key, generate_keypair, sign_digest};
    use gateway_types::Address;
    use k256::ecdsa::SigningKey;
    use serde_json::{json, Value};
    use token_factory::{FactoryProgram, TokenProgram};

    const FACTORY_CODE_ID: u64 = 7;
    const TOKEN_CODE_ID: u64 = 8;

    const OWNER: Address = Address(*b"axelar-owner--------");
    const GATEWAY: Address = Address(*b"gateway-proxy-------");
    const HELPER: Address = Address(*b"crypto-helper-------");

    // =========================================================================
    // TEST FIXTURES
    // =========================================================================

    struct TestStack {
        gateway: GatewayService,
        ledger: Arc<InMemoryLedger>,
        signing_key: SigningKey,
    }

    /// A gateway wired to a ledger hosting the factory and token programs.
    fn stack() -> TestStack {
        crate::init_tracing();
        let (signing_key, verifying_key) = generate_keypair();
        let ledger = Arc::new(
            InMemoryLedger::new()
                .with_program(FACTORY_CODE_ID, Arc::new(FactoryProgram::new()))
                .with_program(TOKEN_CODE_ID, Arc::new(TokenProgram::new())),
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
            ledger.clone() as Arc<dyn ResourceExecutor>,
            DispatcherConfig::default(),
        )
        .expect("valid gateway config");

        TestStack {
            gateway,
            ledger,
            signing_key,
        }
    }

    /// Sign `batch` for `nonce` the way an owner-side signer would.
    fn sign(stack: &TestStack, batch: &Batch, nonce: u64) -> Vec<u8> {
        let encoded = encode_batch(&batch.messages).expect("encodable batch");
        sign_digest(&authorization_digest(&encoded, nonce), &stack.signing_key)
    }

    /// "Instantiate the factory, register it as token_factory", the
    /// canonical first batch of a deployment.
    fn factory_batch() -> Batch {
        Batch::new(vec![SubMessage::Instantiate {
            code_id: FACTORY_CODE_ID,
            label: Some("axelar_token_factory".into()),
            payload: json!({"token_code_id": TOKEN_CODE_ID}),
        }])
        .with_register(vec![RegisterRequest::message_index("token_factory", 0)])
    }

    fn deploy_token_batch(factory: Address) -> Batch {
        Batch::new(vec![SubMessage::Execute {
            contract: factory,
            payload: json!({"deploy_token": {
                "name": "Axelar BTC",
                "symbol": "uBTC",
                "decimals": 8,
                "cap": "21000000",
            }}),
        }])
    }

    fn token_address(stack: &TestStack, factory: Address, symbol: &str) -> Address {
        let resolved = stack
            .ledger
            .query(factory, &json!({"token_address": {"symbol": symbol}}))
            .expect("registered token");
        serde_json::from_value(resolved["token_address"].clone()).expect("address payload")
    }

    fn balance(stack: &TestStack, token: Address, holder: Address) -> Value {
        stack
            .ledger
            .query(token, &json!({"balance": {"address": holder}}))
            .expect("balance query")["balance"]
            .clone()
    }

    // =========================================================================
    // SIGNED DEPLOY-AND-REGISTER
    // =========================================================================

    #[tokio::test]
    async fn signed_factory_deployment_with_replay_rejection() {
        let stack = stack();
        assert_eq!(stack.gateway.current_nonce().await, 0);

        let batch = factory_batch();
        let sig = sign(&stack, &batch, 0);

        // Relayer submits; the gateway executes under its own identity.
        let receipt = stack
            .gateway
            .execute_signed(batch.clone(), &sig)
            .await
            .expect("first submission authorizes");
        assert_eq!(receipt.consumed_nonce, Some(0));
        assert_eq!(stack.gateway.current_nonce().await, 1);

        let factory = stack.gateway.resolve("token_factory").await.unwrap();
        assert_eq!(receipt.outcomes[0].address, Some(factory));
        assert!(stack.ledger.contains(factory));

        // The factory's owner is the gateway, not the relayer or the owner.
        let config = stack
            .ledger
            .query(factory, &json!({"config": {}}))
            .unwrap();
        assert_eq!(config["owner"], serde_json::to_value(GATEWAY).unwrap());

        // Resubmitting the identical (batch, signature) pair must fail: the
        // live digest now binds nonce 1.
        let err = stack.gateway.execute_signed(batch, &sig).await.unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized));
        assert_eq!(stack.gateway.current_nonce().await, 1);
    }

    #[tokio::test]
    async fn direct_path_ignores_nonce_entirely() {
        let stack = stack();

        // Consume a nonce on the signed path first.
        let signed = factory_batch();
        let sig = sign(&stack, &signed, 0);
        stack.gateway.execute_signed(signed, &sig).await.unwrap();
        assert_eq!(stack.gateway.current_nonce().await, 1);

        // The owner drives directly; nonce stays wherever it was.
        let factory = stack.gateway.resolve("token_factory").await.unwrap();
        let receipt = stack
            .gateway
            .execute_direct(OWNER, deploy_token_batch(factory))
            .await
            .expect("owner direct path");
        assert_eq!(receipt.consumed_nonce, None);
        assert_eq!(stack.gateway.current_nonce().await, 1);
    }

    // =========================================================================
    // FACTORY CHOREOGRAPHY
    // =========================================================================

    #[tokio::test]
    async fn deploy_mint_and_transfer_through_signed_batches() {
        let stack = stack();

        // Nonce 0: stand up the factory.
        let batch = factory_batch();
        let sig = sign(&stack, &batch, 0);
        stack.gateway.execute_signed(batch, &sig).await.unwrap();
        let factory = stack.gateway.resolve("token_factory").await.unwrap();

        // Nonce 1: deploy uBTC. The init hook binds the symbol in the same
        // batch window.
        let batch = deploy_token_batch(factory);
        let sig = sign(&stack, &batch, 1);
        stack.gateway.execute_signed(batch, &sig).await.unwrap();

        let token = token_address(&stack, factory, "uBTC");
        assert!(stack.ledger.contains(token));

        // Nonce 2: mint to the gateway itself, then pay a user out of that
        // balance in the same batch. The gateway holds mint authority
        // because it was the factory's caller.
        let alice = Address::new([0x11; 20]);
        let batch = Batch::new(vec![
            SubMessage::Execute {
                contract: token,
                payload: json!({"mint": {"recipient": GATEWAY, "amount": "500"}}),
            },
            SubMessage::Execute {
                contract: token,
                payload: json!({"transfer": {"recipient": alice, "amount": "200"}}),
            },
        ]);
        let sig = sign(&stack, &batch, 2);
        stack.gateway.execute_signed(batch, &sig).await.unwrap();
        assert_eq!(balance(&stack, token, GATEWAY), json!("300"));
        assert_eq!(balance(&stack, token, alice), json!("200"));

        // Double-deploying the same symbol fails wholesale.
        let batch = deploy_token_batch(factory);
        let sig = sign(&stack, &batch, 3);
        let err = stack.gateway.execute_signed(batch, &sig).await.unwrap_err();
        assert!(matches!(
            err,
            GatewayError::SubMessageFailed { index: 0, .. }
        ));
        // The failed attempt still consumed nonce 3.
        assert_eq!(stack.gateway.current_nonce().await, 4);
    }

    #[tokio::test]
    async fn batched_queries_report_results_in_order() {
        let stack = stack();
        stack
            .gateway
            .execute_direct(OWNER, factory_batch())
            .await
            .unwrap();
        let factory = stack.gateway.resolve("token_factory").await.unwrap();

        let receipt = stack
            .gateway
            .execute_direct(
                OWNER,
                Batch::new(vec![
                    SubMessage::Query {
                        contract: factory,
                        payload: json!({"config": {}}),
                    },
                    SubMessage::Execute {
                        contract: factory,
                        payload: json!({"deploy_token": {
                            "name": "Axelar ETH",
                            "symbol": "uETH",
                            "decimals": 18,
                            "cap": "1000000",
                        }}),
                    },
                ]),
            )
            .await
            .unwrap();

        assert_eq!(receipt.outcomes.len(), 2);
        let config = receipt.outcomes[0].data.as_ref().unwrap();
        assert_eq!(config["token_code_id"], json!(TOKEN_CODE_ID));
        assert!(stack.ledger.contains(token_address(&stack, factory, "uETH")));
    }

    // =========================================================================
    // ATOMICITY
    // =========================================================================

    #[tokio::test]
    async fn failing_tail_message_rolls_back_the_whole_batch() {
        let stack = stack();
        stack
            .gateway
            .execute_direct(OWNER, factory_batch())
            .await
            .unwrap();
        let factory = stack.gateway.resolve("token_factory").await.unwrap();

        // Deploy succeeds at index 0, then index 1 dispatches into nowhere.
        let ghost = Address::new([0xEE; 20]);
        let batch = Batch::new(vec![
            SubMessage::Execute {
                contract: factory,
                payload: json!({"deploy_token": {
                    "name": "Axelar BTC",
                    "symbol": "uBTC",
                    "decimals": 8,
                    "cap": "21000000",
                }}),
            },
            SubMessage::Execute {
                contract: ghost,
                payload: json!({}),
            },
        ])
        .with_register(vec![RegisterRequest::address("doomed", ghost)]);

        let err = stack
            .gateway
            .execute_direct(OWNER, batch)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GatewayError::SubMessageFailed { index: 1, .. }
        ));

        // No trace of the deploy: the symbol is unknown again and the name
        // was never registered.
        let err = stack
            .ledger
            .query(factory, &json!({"token_address": {"symbol": "uBTC"}}))
            .unwrap_err();
        assert!(format!("{err}").contains("no token"));
        assert!(matches!(
            stack.gateway.resolve("doomed").await,
            Err(GatewayError::NotFound(_))
        ));

        // The symbol can be deployed cleanly afterwards.
        stack
            .gateway
            .execute_direct(OWNER, deploy_token_batch(factory))
            .await
            .unwrap();
        assert!(stack.ledger.contains(token_address(&stack, factory, "uBTC")));
    }

    #[tokio::test]
    async fn registry_collision_rolls_back_ledger_effects() {
        let stack = stack();
        stack
            .gateway
            .execute_direct(OWNER, factory_batch())
            .await
            .unwrap();

        // A name already taken is rejected before anything executes.
        let err = stack
            .gateway
            .execute_direct(OWNER, factory_batch())
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NameAlreadyRegistered(_)));

        // Duplicate names inside one batch pass the pre-check but fail at
        // commit time, and the executed instantiate must be rolled back.
        let batch = Batch::new(vec![SubMessage::Instantiate {
            code_id: FACTORY_CODE_ID,
            label: None,
            payload: json!({"token_code_id": TOKEN_CODE_ID}),
        }])
        .with_register(vec![
            RegisterRequest::message_index("dup", 0),
            RegisterRequest::message_index("dup", 0),
        ]);
        let err = stack
            .gateway
            .execute_direct(OWNER, batch)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NameAlreadyRegistered(_)));
        assert!(matches!(
            stack.gateway.resolve("dup").await,
            Err(GatewayError::NotFound(_))
        ));

        let stats = stack.gateway.stats().await;
        assert_eq!(stats.names_registered, 1);
        assert_eq!(stats.aborted_batches, 1);
    }

    // =========================================================================
    // FAILURE CHANNELS
    // =========================================================================

    #[tokio::test]
    async fn relayer_garbage_is_rejected_without_burning_nonces() {
        let stack = stack();
        let batch = factory_batch();

        for junk in [vec![0u8; 64], vec![0xFF; 64], vec![1u8; 3]] {
            let err = stack
                .gateway
                .execute_signed(batch.clone(), &junk)
                .await
                .unwrap_err();
            assert!(matches!(err, GatewayError::Unauthorized));
        }
        // The owner's real signature for nonce 0 still works.
        let sig = sign(&stack, &batch, 0);
        assert!(stack.gateway.execute_signed(batch, &sig).await.is_ok());
    }

    #[tokio::test]
    async fn wrong_owner_key_never_authorizes() {
        let stack = stack();
        let (mallory_key, _) = generate_keypair();

        let batch = factory_batch();
        let encoded = encode_batch(&batch.messages).unwrap();
        let forged = sign_digest(&authorization_digest(&encoded, 0), &mallory_key);

        let err = stack
            .gateway
            .execute_signed(batch, &forged)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Unauthorized));
        assert_eq!(stack.gateway.current_nonce().await, 0);
    }
}
