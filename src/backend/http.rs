//! REST client for the transaction backend.

use super::TransactionBackend;
use crate::{
    error::{Boundary, GatewayError},
    types::{BuildRequest, TokenBalance, TransactionKind, UnsignedTransaction},
};
use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, Response};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::trace;
use url::Url;

/// [`TransactionBackend`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: Url,
}

impl HttpBackend {
    /// Creates a new backend client rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    /// Creates a new backend client using an existing [`Client`].
    pub fn with_client(client: Client, base_url: Url) -> Self {
        Self { client, base_url }
    }

    /// Resolves `path` against the base URL.
    fn endpoint(&self, path: &str) -> Result<Url, GatewayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/{path}"))
            .map_err(|err| GatewayError::Message(format!("invalid backend url: {err}")))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|err| GatewayError::from_reqwest(Boundary::Backend, err));
        }

        let message = response.text().await.unwrap_or_default();
        Err(GatewayError::http(Boundary::Backend, status.as_u16(), message))
    }
}

#[async_trait]
impl TransactionBackend for HttpBackend {
    async fn token_balances(&self, address: Address) -> Result<Vec<TokenBalance>, GatewayError> {
        let url = self.endpoint(&format!("balances/{address}"))?;
        trace!(%url, "Fetching balances");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| GatewayError::from_reqwest(Boundary::Backend, err))?;
        Self::decode(response).await
    }

    async fn allowance_transaction(
        &self,
        address: Address,
        amount: Decimal,
    ) -> Result<Option<UnsignedTransaction>, GatewayError> {
        let url = self.endpoint(&format!("allowance/{address}"))?;
        trace!(%url, %amount, "Fetching allowance transaction");

        let response = self
            .client
            .get(url)
            .query(&[("amount", amount.to_string())])
            .send()
            .await
            .map_err(|err| GatewayError::from_reqwest(Boundary::Backend, err))?;
        Self::decode(response).await
    }

    async fn build_transaction(
        &self,
        request: &BuildRequest,
    ) -> Result<UnsignedTransaction, GatewayError> {
        let url = self.endpoint(&format!("transactions/{}", request.kind.endpoint()))?;
        let body = match &request.kind {
            TransactionKind::Approve { amount } => {
                json!({ "address": request.address, "amount": amount })
            }
            TransactionKind::Operation(params) => {
                json!({ "address": request.address, "params": params })
            }
        };
        trace!(%url, "Requesting unsigned transaction");

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|err| GatewayError::from_reqwest(Boundary::Backend, err))?;
        Self::decode(response).await
    }
}
