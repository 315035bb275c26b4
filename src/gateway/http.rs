//! Client of the custodial signing service.

use super::SigningGateway;
use crate::{
    config::ChainConfig,
    error::{Boundary, GatewayError},
    types::{SigningSession, UnsignedTransaction},
};
use alloy::primitives::{Address, B256};
use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::{Deserialize, de::DeserializeOwned};
use tracing::{debug, error};
use url::Url;

#[derive(Debug, Deserialize)]
struct AddressResponse {
    address: Address,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    hash: B256,
}

/// Error body of the signing service.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(alias = "error")]
    message: String,
}

/// [`SigningGateway`] backed by the custodial signing service.
///
/// The service holds the keys of a proxy wallet per user and is authenticated with the session's
/// bearer token.
#[derive(Debug, Clone)]
pub struct HttpSigningGateway {
    client: Client,
    base_url: Url,
}

impl HttpSigningGateway {
    /// Creates a new gateway rooted at `base_url`.
    pub fn new(base_url: Url) -> Self {
        Self { client: Client::new(), base_url }
    }

    fn endpoint(&self, chain: &ChainConfig, path: &str) -> Result<Url, GatewayError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}/wallets/{}/{path}", chain.chain_id))
            .map_err(|err| GatewayError::Message(format!("invalid signer url: {err}")))
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|err| GatewayError::from_reqwest(Boundary::Signer, err));
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|err| err.message)
            .unwrap_or(body);
        if status.is_server_error() {
            error!(%status, %message, "Signing service error");
        }
        Err(GatewayError::http(Boundary::Signer, status.as_u16(), message))
    }
}

#[async_trait]
impl SigningGateway for HttpSigningGateway {
    async fn address(
        &self,
        session: &SigningSession,
        chain: &ChainConfig,
    ) -> Result<Address, GatewayError> {
        let response = self
            .client
            .get(self.endpoint(chain, "address")?)
            .bearer_auth(session.token())
            .send()
            .await
            .map_err(|err| GatewayError::from_reqwest(Boundary::Signer, err))?;

        Ok(Self::decode::<AddressResponse>(response).await?.address)
    }

    async fn submit(
        &self,
        session: &SigningSession,
        chain: &ChainConfig,
        tx: UnsignedTransaction,
    ) -> Result<B256, GatewayError> {
        let response = self
            .client
            .post(self.endpoint(chain, "transactions")?)
            .bearer_auth(session.token())
            .json(&tx)
            .send()
            .await
            .map_err(|err| GatewayError::from_reqwest(Boundary::Signer, err))?;

        let hash = Self::decode::<SubmitResponse>(response).await?.hash;
        debug!(%hash, chain = %chain.name, "Signing service broadcast transaction");
        Ok(hash)
    }
}
