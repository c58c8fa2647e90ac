//! Cross-crate integration tests: the dispatcher, the in-memory ledger, and
//! the token factory programs working together.

pub mod concurrency;
pub mod relay_flows;
