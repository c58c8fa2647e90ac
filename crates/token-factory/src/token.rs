//! # Token Program
//!
//! The capped, mintable token the factory deploys. Mint authority is fixed
//! at instantiation and the total supply can never pass the cap.

use crate::msg::{parse_payload, parse_state, to_value, Amount, TokenHandle, TokenInit, TokenQuery};
use gateway_core::adapters::{CallContext, Program, ProgramResponse};
use gateway_core::domain::entities::SubMessage;
use gateway_core::domain::errors::ProgramError;
use gateway_types::Address;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Persisted token state. Balances key on full hex addresses.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct TokenState {
    name: String,
    symbol: String,
    decimals: u8,
    total_supply: Amount,
    minter: Address,
    cap: Amount,
    balances: BTreeMap<String, Amount>,
}

impl TokenState {
    fn balance_of(&self, address: Address) -> Amount {
        self.balances
            .get(&address.to_hex())
            .copied()
            .unwrap_or(Amount::ZERO)
    }

    fn credit(&mut self, address: Address, amount: Amount) -> Result<(), ProgramError> {
        let entry = self.balances.entry(address.to_hex()).or_insert(Amount::ZERO);
        *entry = entry
            .checked_add(amount)
            .ok_or_else(|| ProgramError::Failure("balance overflow".into()))?;
        Ok(())
    }

    fn debit(&mut self, address: Address, amount: Amount) -> Result<(), ProgramError> {
        let available = self.balance_of(address);
        let remaining = available
            .checked_sub(amount)
            .ok_or(ProgramError::InsufficientFunds {
                needed: amount.0,
                available: available.0,
            })?;
        if remaining == Amount::ZERO {
            self.balances.remove(&address.to_hex());
        } else {
            self.balances.insert(address.to_hex(), remaining);
        }
        Ok(())
    }
}

/// The token resource program.
#[derive(Debug, Clone, Default)]
pub struct TokenProgram;

impl TokenProgram {
    /// Create the program.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Program for TokenProgram {
    fn instantiate(
        &self,
        _ctx: &CallContext,
        payload: &Value,
    ) -> Result<ProgramResponse, ProgramError> {
        let init: TokenInit = parse_payload(payload)?;

        // Gateway tokens must carry mint authority and a cap.
        let mint = init
            .mint
            .ok_or_else(|| ProgramError::InvalidPayload("minter data required".into()))?;

        let state = TokenState {
            name: init.name,
            symbol: init.symbol,
            decimals: init.decimals,
            total_supply: Amount::ZERO,
            minter: mint.minter,
            cap: mint.cap,
            balances: BTreeMap::new(),
        };

        let messages = match init.init_hook {
            Some(hook) => vec![SubMessage::Execute {
                contract: hook.contract_addr,
                payload: hook.payload,
            }],
            None => Vec::new(),
        };

        Ok(ProgramResponse {
            state: to_value(&state)?,
            messages,
            data: None,
        })
    }

    fn execute(
        &self,
        ctx: &CallContext,
        state: &Value,
        payload: &Value,
    ) -> Result<ProgramResponse, ProgramError> {
        let mut state: TokenState = parse_state(state)?;

        match parse_payload(payload)? {
            TokenHandle::Mint { recipient, amount } => {
                if ctx.sender != state.minter {
                    return Err(ProgramError::Unauthorized);
                }
                let attempted = state
                    .total_supply
                    .checked_add(amount)
                    .ok_or_else(|| ProgramError::Failure("supply overflow".into()))?;
                if attempted > state.cap {
                    return Err(ProgramError::CapExceeded {
                        cap: state.cap.0,
                        attempted: attempted.0,
                    });
                }
                state.total_supply = attempted;
                state.credit(recipient, amount)?;
            }
            TokenHandle::Transfer { recipient, amount } => {
                state.debit(ctx.sender, amount)?;
                state.credit(recipient, amount)?;
            }
            TokenHandle::Burn { amount } => {
                state.debit(ctx.sender, amount)?;
                // debit guarantees amount <= total_supply here
                state.total_supply = state
                    .total_supply
                    .checked_sub(amount)
                    .ok_or_else(|| ProgramError::Failure("supply underflow".into()))?;
            }
        }

        Ok(ProgramResponse::state_only(to_value(&state)?))
    }

    fn query(
        &self,
        _ctx: &CallContext,
        state: &Value,
        payload: &Value,
    ) -> Result<Value, ProgramError> {
        let state: TokenState = parse_state(state)?;
        match parse_payload(payload)? {
            TokenQuery::Balance { address } => Ok(json!({
                "balance": state.balance_of(address),
            })),
            TokenQuery::TokenInfo {} => Ok(json!({
                "name": state.name,
                "symbol": state.symbol,
                "decimals": state.decimals,
                "total_supply": state.total_supply,
                "cap": state.cap,
            })),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
