//! Backend that manufactures unsigned transactions and reports balances.

mod http;
pub use http::HttpBackend;

use crate::{
    error::GatewayError,
    types::{BuildRequest, TokenBalance, UnsignedTransaction},
};
use alloy::primitives::Address;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::fmt::Debug;

/// The transaction backend.
///
/// All transaction encoding happens behind this boundary, the pipeline never builds calldata
/// itself.
#[async_trait]
pub trait TransactionBackend: Debug + Send + Sync {
    /// Returns every token balance of `address` across chains.
    async fn token_balances(&self, address: Address) -> Result<Vec<TokenBalance>, GatewayError>;

    /// Returns the approval transaction `address` needs before `amount` of the position token can
    /// be spent, or `None` when the current allowance suffices.
    async fn allowance_transaction(
        &self,
        address: Address,
        amount: Decimal,
    ) -> Result<Option<UnsignedTransaction>, GatewayError>;

    /// Builds the transaction described by `request`.
    async fn build_transaction(
        &self,
        request: &BuildRequest,
    ) -> Result<UnsignedTransaction, GatewayError>;
}
