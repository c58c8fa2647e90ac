//! # Token Factory
//!
//! Downstream resources managed by the gateway: a factory that deploys
//! tokens by symbol (deploy-once, then resolve) and the capped, mintable
//! token it deploys.
//!
//! Both are [`Program`](gateway_core::adapters::Program) implementations
//! hosted by the ledger executor. The factory uses the init-hook pattern:
//! deploying a token emits a follow-up instantiate, and the freshly created
//! token calls back into the factory to bind its address to the pending
//! symbol.

pub mod factory;
pub mod msg;
pub mod token;

pub use factory::FactoryProgram;
pub use msg::{
    Amount, FactoryHandle, FactoryInit, FactoryQuery, InitHook, MinterData, TokenHandle,
    TokenInit, TokenQuery,
};
pub use token::TokenProgram;
