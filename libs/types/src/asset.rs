//! Asset and network identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Chain / network identifier (1 = Ethereum, 10 = Optimism, 137 = Polygon, ...)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub u64);

impl NetworkId {
    pub const ETHEREUM: NetworkId = NetworkId(1);
    pub const OPTIMISM: NetworkId = NetworkId(10);
    pub const POLYGON: NetworkId = NetworkId(137);
    pub const ARBITRUM: NetworkId = NetworkId(42161);

    pub fn chain_id(&self) -> u64 {
        self.0
    }
}

impl Default for NetworkId {
    fn default() -> Self {
        Self::ETHEREUM
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for NetworkId {
    fn from(chain_id: u64) -> Self {
        Self(chain_id)
    }
}

/// A convertible asset as the user selected it.
///
/// Equality is by value over every field, so two independently constructed
/// descriptions of the same token compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    /// Contract address (or native-asset sentinel) on the active network
    pub address: String,
    pub symbol: String,
    /// Native precision; amounts for this asset are scaled by 10^decimals
    pub decimals: u8,
}

impl Asset {
    pub fn new(address: impl Into<String>, symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            address: address.into(),
            symbol: symbol.into(),
            decimals,
        }
    }
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = self.address.get(..10).unwrap_or(&self.address);
        write!(f, "{} ({})", self.symbol, short)
    }
}
