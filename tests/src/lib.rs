//! # Wasm-Gateway Test Suite
//!
//! Unified test crate for cross-crate flows.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/      # Gateway + ledger + resource program choreography
//!     ├── relay_flows.rs
//!     └── concurrency.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p gateway-tests
//!
//! # By category
//! cargo test -p gateway-tests integration::
//! ```

#![allow(dead_code)]

pub mod integration;

use std::sync::Once;

/// Install a compact subscriber once per process. Honors `RUST_LOG`; tests
/// stay silent without it.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}
