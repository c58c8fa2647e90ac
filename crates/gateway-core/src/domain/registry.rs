//! # Registry
//!
//! Write-once mapping from logical resource names to addresses.
//!
//! Entries are created only as a side effect of successful batch execution;
//! once a name is bound its address never changes. This models the
//! deploy-once-then-resolve pattern for dependent contracts: deploy a token
//! factory in one batch, then let later batches find it by name.

use crate::domain::errors::RegistryError;
use gateway_types::Address;
use std::collections::HashMap;
use std::sync::RwLock;

/// Name → address table. Thread-safe; no removal API by design.
#[derive(Debug, Default)]
pub struct Registry {
    entries: RwLock<HashMap<String, Address>>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `name` to `address`.
    ///
    /// Fails with [`RegistryError::NameAlreadyRegistered`] if the name is
    /// taken; the table is unchanged on failure.
    pub fn register(&self, name: &str, address: Address) -> Result<(), RegistryError> {
        self.register_all(std::slice::from_ref(&(name.to_owned(), address)))
    }

    /// Bind every pair, or none of them.
    ///
    /// Checks every name (against existing entries and against duplicates
    /// within `pairs`) before inserting anything, so a partial commit is
    /// impossible.
    pub fn register_all(&self, pairs: &[(String, Address)]) -> Result<(), RegistryError> {
        let mut entries = self.entries.write().unwrap();

        for (i, (name, _)) in pairs.iter().enumerate() {
            if entries.contains_key(name)
                || pairs[..i].iter().any(|(earlier, _)| earlier == name)
            {
                return Err(RegistryError::NameAlreadyRegistered(name.clone()));
            }
        }
        for (name, address) in pairs {
            entries.insert(name.clone(), *address);
        }
        Ok(())
    }

    /// Look up a registered name.
    pub fn resolve(&self, name: &str) -> Result<Address, RegistryError> {
        self.entries
            .read()
            .unwrap()
            .get(name)
            .copied()
            .ok_or_else(|| RegistryError::NotFound(name.to_owned()))
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.read().unwrap().contains_key(name)
    }

    /// Number of registered names.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap().len()
    }

    /// True if nothing has been registered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// =============================================================================
// TESTS
// =============================================================================
