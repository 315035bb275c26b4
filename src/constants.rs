//! Pipeline constants.

use rust_decimal::Decimal;

/// Minimum native gas balance an account must hold before a value-moving transaction is attempted.
///
/// Expressed in whole units of the native asset (0.0001 ETH).
pub const MIN_NATIVE_GAS_BALANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

/// Name fragment of the position token in the balance list.
///
/// Matched case-insensitively as a substring, so `rETH` and `reth-base` both qualify.
pub const DEFAULT_POSITION_TOKEN: &str = "reth";

/// Symbol of the native gas asset.
pub const DEFAULT_NATIVE_SYMBOL: &str = "ETH";

/// Chain the pipeline targets by default.
pub const DEFAULT_CHAIN_NAME: &str = "base";

/// Chain id of [`DEFAULT_CHAIN_NAME`].
pub const DEFAULT_CHAIN_ID: u64 = 8453;

/// Route of the acquisition flow suggested when the position token balance is too low.
pub const DEFAULT_SWAP_ROUTE: &str = "/swap";

/// Default base URL of the transaction backend.
pub const DEFAULT_BACKEND_URL: &str = "http://localhost:8080/api/";

/// Default base URL of the custodial signing service.
pub const DEFAULT_SIGNER_URL: &str = "http://localhost:8090/";
