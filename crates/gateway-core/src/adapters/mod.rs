//! Adapters implementing the outbound ports: the crypto-helper signature
//! verifier and an in-memory ledger executor.

pub mod crypto;
pub mod ledger;

pub use crypto::CryptoHelperAdapter;
pub use ledger::{CallContext, InMemoryLedger, Program, ProgramResponse};
