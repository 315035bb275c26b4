//! Delivery of unsigned transactions to a signer.
//!
//! The gateway signs and broadcasts, returning the transaction hash. It does not retry, and its
//! failures are left for the [classifier](crate::error::classify) to interpret.

mod http;
pub use http::HttpSigningGateway;

mod local;
pub use local::LocalSigningGateway;

use crate::{
    config::ChainConfig,
    error::GatewayError,
    types::{SigningSession, UnsignedTransaction},
};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use std::fmt::Debug;

/// Signs and broadcasts transactions on behalf of a session.
#[async_trait]
pub trait SigningGateway: Debug + Send + Sync {
    /// Returns the address the session signs with on `chain`.
    async fn address(
        &self,
        session: &SigningSession,
        chain: &ChainConfig,
    ) -> Result<Address, GatewayError>;

    /// Signs and broadcasts `tx`, returning its hash.
    async fn submit(
        &self,
        session: &SigningSession,
        chain: &ChainConfig,
        tx: UnsignedTransaction,
    ) -> Result<B256, GatewayError>;
}
