use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single entry of the balance list returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenBalance {
    /// Token name or symbol, e.g. `ETH` or `rETH`.
    pub token: String,
    /// Name of the chain holding the balance, e.g. `base`.
    pub chain_name: String,
    /// Balance in whole token units.
    pub amount: Decimal,
}

/// Balances relevant to a value-moving operation.
///
/// Always read fresh, balances can move between opening a flow and confirming it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Balances {
    /// Balance of the native gas asset.
    pub native_gas: Decimal,
    /// Balance of the position token.
    pub position_token: Decimal,
}
