use crate::{
    backend::TransactionBackend,
    config::ChainConfig,
    error::GatewayError,
    types::{Balances, TokenBalance},
};
use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::trace;

/// Reads the native gas and position token balances of an account.
#[derive(Debug, Clone)]
pub struct ChainBalanceReader {
    backend: Arc<dyn TransactionBackend>,
    position_token: String,
}

impl ChainBalanceReader {
    /// Creates a new [`ChainBalanceReader`] for the position token named `position_token`.
    pub fn new(backend: Arc<dyn TransactionBackend>, position_token: impl Into<String>) -> Self {
        Self { backend, position_token: position_token.into() }
    }

    /// Returns the balances of `address` on `chain`.
    pub async fn balances(
        &self,
        address: Address,
        chain: &ChainConfig,
    ) -> Result<Balances, GatewayError> {
        let entries = self.backend.token_balances(address).await?;
        let balances = select_balances(&entries, chain, &self.position_token);
        trace!(%address, chain = %chain.name, ?balances, "Read balances");
        Ok(balances)
    }
}

/// Picks the balances for `chain` out of a balance list.
///
/// The native asset is matched by symbol, the position token by substring, both ignoring case.
/// Tokens missing from the list read as zero.
pub fn select_balances(
    entries: &[TokenBalance],
    chain: &ChainConfig,
    position_token: &str,
) -> Balances {
    let native = chain.native_symbol.to_lowercase();
    let position = position_token.to_lowercase();

    let find = |matches: &dyn Fn(&str) -> bool| {
        entries
            .iter()
            .filter(|entry| entry.chain_name.eq_ignore_ascii_case(&chain.name))
            .find(|entry| matches(entry.token.to_lowercase().as_str()))
            .map(|entry| entry.amount)
            .unwrap_or(Decimal::ZERO)
    };

    Balances {
        native_gas: find(&|token| token == native),
        position_token: find(&|token| token.contains(&position)),
    }
}
