//! # Message Types
//!
//! Typed payloads and responses for the factory and token programs, plus the
//! string-encoded [`Amount`] used for all token arithmetic.

use gateway_core::domain::errors::ProgramError;
use gateway_types::Address;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// =============================================================================
// AMOUNT (string-encoded u128)
// =============================================================================

/// A token amount.
///
/// Serialized as a decimal string: JSON numbers cannot carry a full `u128`,
/// and string encoding keeps amounts exact across every client.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(pub u128);

impl Amount {
    /// The zero amount.
    pub const ZERO: Self = Self(0);

    /// Addition that fails instead of wrapping.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Subtraction that fails instead of wrapping.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Amount {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse()
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {text}")))
    }
}

// =============================================================================
// SHARED
// =============================================================================

/// A callback a freshly instantiated contract fires at its deployer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InitHook {
    /// Contract to call back.
    pub contract_addr: Address,
    /// Payload to execute on it.
    pub payload: Value,
}

// =============================================================================
// FACTORY MESSAGES
// =============================================================================

/// Factory instantiation payload.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FactoryInit {
    /// Code id the factory instantiates tokens from.
    pub token_code_id: u64,
}

/// Factory handle payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryHandle {
    /// Deploy a new token under a unique symbol. Owner-only.
    DeployToken {
        /// Token display name.
        name: String,
        /// Unique symbol; the factory's write-once key.
        symbol: String,
        /// Decimal places.
        decimals: u8,
        /// Hard supply cap for the deployed token.
        cap: Amount,
    },
    /// Init-hook target: the deployed token binds its own address to the
    /// pending symbol.
    Register {
        /// Symbol being registered.
        symbol: String,
    },
}

/// Factory query payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactoryQuery {
    /// Factory configuration.
    Config {},
    /// Resolve a deployed token's address by symbol.
    TokenAddress {
        /// Symbol to look up.
        symbol: String,
    },
}

// =============================================================================
// TOKEN MESSAGES
// =============================================================================

/// Mint authority for a token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MinterData {
    /// The only address allowed to mint.
    pub minter: Address,
    /// Hard total-supply cap.
    pub cap: Amount,
}

/// Token instantiation payload. Gateway tokens must carry mint authority.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenInit {
    /// Token display name.
    pub name: String,
    /// Token symbol.
    pub symbol: String,
    /// Decimal places.
    pub decimals: u8,
    /// Mint authority; required.
    pub mint: Option<MinterData>,
    /// Optional deployer callback fired after instantiation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_hook: Option<InitHook>,
}

/// Token handle payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenHandle {
    /// Mint new supply to `recipient`. Minter-only, cap-enforced.
    Mint {
        /// Receiving address.
        recipient: Address,
        /// Amount to mint.
        amount: Amount,
    },
    /// Move balance from the sender to `recipient`.
    Transfer {
        /// Receiving address.
        recipient: Address,
        /// Amount to move.
        amount: Amount,
    },
    /// Destroy part of the sender's balance.
    Burn {
        /// Amount to burn.
        amount: Amount,
    },
}

/// Token query payloads.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenQuery {
    /// Balance of one address.
    Balance {
        /// Address to look up.
        address: Address,
    },
    /// Name, symbol, decimals, supply, cap.
    TokenInfo {},
}

// =============================================================================
// PAYLOAD HELPERS
// =============================================================================

/// Deserialize a program payload, mapping schema mismatches to
/// [`ProgramError::InvalidPayload`].
pub(crate) fn parse_payload<T: DeserializeOwned>(payload: &Value) -> Result<T, ProgramError> {
    serde_json::from_value(payload.clone())
        .map_err(|err| ProgramError::InvalidPayload(err.to_string()))
}

/// Deserialize persisted contract state; a mismatch here is corruption, not
/// caller error.
pub(crate) fn parse_state<T: DeserializeOwned>(state: &Value) -> Result<T, ProgramError> {
    serde_json::from_value(state.clone())
        .map_err(|err| ProgramError::Failure(format!("corrupt contract state: {err}")))
}

/// Serialize state or response data.
pub(crate) fn to_value<T: Serialize>(value: &T) -> Result<Value, ProgramError> {
    serde_json::to_value(value).map_err(|err| ProgramError::Failure(err.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================
