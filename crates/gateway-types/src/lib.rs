//! # Shared Types Crate
//!
//! Value objects shared by every crate in the Wasm-Gateway workspace.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: cross-crate primitives (`Address`, `Hash`)
//!   are defined here and nowhere else.
//! - **Value semantics**: these types are defined by their bytes, not by
//!   identity, and are cheap to copy.

pub mod value_objects;

pub use value_objects::{Address, AddressParseError, Hash};
