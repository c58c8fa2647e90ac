//! # Factory Program
//!
//! Deploys tokens by symbol, write-once: a symbol gets a pending entry when
//! its deploy is accepted and a bound address when the new token's init hook
//! calls back. Resolution by symbol only succeeds once the hook has fired.

use crate::msg::{
    parse_payload, parse_state, to_value, Amount, FactoryHandle, FactoryInit, FactoryQuery,
    InitHook, MinterData, TokenInit,
};
use gateway_core::adapters::{CallContext, Program, ProgramResponse};
use gateway_core::domain::entities::SubMessage;
use gateway_core::domain::errors::ProgramError;
use gateway_types::Address;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tracing::debug;

/// Persisted factory state.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct FactoryState {
    /// Who may deploy tokens; set to the instantiating sender.
    owner: Address,
    /// Code id tokens are instantiated from.
    token_code_id: u64,
    /// Symbol → deployed address. `None` marks a deploy awaiting its
    /// register hook.
    tokens: BTreeMap<String, Option<Address>>,
}

/// The token factory resource program.
#[derive(Debug, Clone, Default)]
pub struct FactoryProgram;

impl FactoryProgram {
    /// Create the program.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn deploy_token(
        ctx: &CallContext,
        mut state: FactoryState,
        name: String,
        symbol: String,
        decimals: u8,
        cap: Amount,
    ) -> Result<ProgramResponse, ProgramError> {
        if ctx.sender != state.owner {
            return Err(ProgramError::Unauthorized);
        }
        if state.tokens.contains_key(&symbol) {
            return Err(ProgramError::AlreadyExists(format!("token {symbol}")));
        }

        // Mark intent; the deployed token's hook binds the address.
        state.tokens.insert(symbol.clone(), None);

        let init = TokenInit {
            name: name.clone(),
            symbol: symbol.clone(),
            decimals,
            mint: Some(MinterData {
                // The deploying caller owns the new token's mint authority.
                minter: ctx.sender,
                cap,
            }),
            init_hook: Some(InitHook {
                contract_addr: ctx.contract,
                payload: json!({ "register": { "symbol": symbol } }),
            }),
        };
        debug!(%symbol, "token deployment staged");

        Ok(ProgramResponse {
            state: to_value(&state)?,
            messages: vec![SubMessage::Instantiate {
                code_id: state.token_code_id,
                label: Some(name),
                payload: to_value(&init)?,
            }],
            data: None,
        })
    }

    fn register_token(
        ctx: &CallContext,
        mut state: FactoryState,
        symbol: String,
    ) -> Result<ProgramResponse, ProgramError> {
        match state.tokens.get(&symbol) {
            None => {
                return Err(ProgramError::NotFound(format!(
                    "no deployed token for {symbol}"
                )))
            }
            Some(Some(_)) => {
                return Err(ProgramError::AlreadyExists(format!(
                    "token {symbol} already registered"
                )))
            }
            Some(None) => {}
        }

        // The hook's sender is the freshly instantiated token.
        state.tokens.insert(symbol.clone(), Some(ctx.sender));
        debug!(%symbol, token = %ctx.sender, "token address bound");

        Ok(ProgramResponse::state_only(to_value(&state)?))
    }
}

impl Program for FactoryProgram {
    fn instantiate(
        &self,
        ctx: &CallContext,
        payload: &Value,
    ) -> Result<ProgramResponse, ProgramError> {
        let init: FactoryInit = parse_payload(payload)?;
        let state = FactoryState {
            owner: ctx.sender,
            token_code_id: init.token_code_id,
            tokens: BTreeMap::new(),
        };
        Ok(ProgramResponse::state_only(to_value(&state)?))
    }

    fn execute(
        &self,
        ctx: &CallContext,
        state: &Value,
        payload: &Value,
    ) -> Result<ProgramResponse, ProgramError> {
        let state: FactoryState = parse_state(state)?;
        match parse_payload(payload)? {
            FactoryHandle::DeployToken {
                name,
                symbol,
                decimals,
                cap,
            } => Self::deploy_token(ctx, state, name, symbol, decimals, cap),
            FactoryHandle::Register { symbol } => Self::register_token(ctx, state, symbol),
        }
    }

    fn query(
        &self,
        _ctx: &CallContext,
        state: &Value,
        payload: &Value,
    ) -> Result<Value, ProgramError> {
        let state: FactoryState = parse_state(state)?;
        match parse_payload(payload)? {
            FactoryQuery::Config {} => Ok(json!({
                "owner": state.owner,
                "token_code_id": state.token_code_id,
            })),
            FactoryQuery::TokenAddress { symbol } => {
                let address = state
                    .tokens
                    .get(&symbol)
                    .copied()
                    .flatten()
                    .ok_or_else(|| ProgramError::NotFound(format!("no token for {symbol}")))?;
                Ok(json!({ "token_address": address }))
            }
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
