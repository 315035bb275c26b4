//! Signing with a local key, for development chains.

use super::SigningGateway;
use crate::{
    config::ChainConfig,
    error::GatewayError,
    signers::DynSigner,
    types::{SigningSession, UnsignedTransaction},
};
use alloy::{
    consensus::{TxEip1559, TypedTransaction},
    eips::Encodable2718,
    network::{Ethereum, EthereumWallet, NetworkWallet},
    primitives::{Address, B256},
    providers::{DynProvider, Provider, ProviderBuilder},
};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// [`SigningGateway`] that signs with a local key and broadcasts through a JSON-RPC node.
///
/// The session is not consulted, whoever holds the key may sign.
#[derive(Debug, Clone)]
pub struct LocalSigningGateway {
    /// Provider used to broadcast.
    provider: DynProvider,
    /// Inner [`EthereumWallet`] used to sign transactions.
    wallet: EthereumWallet,
    /// Address of the wallet's signer.
    address: Address,
}

impl LocalSigningGateway {
    /// Creates a new gateway signing with `signer` and broadcasting to `endpoint`.
    pub fn new(signer: DynSigner, endpoint: Url) -> Self {
        let provider = ProviderBuilder::new().connect_http(endpoint).erased();
        Self::with_provider(signer, provider)
    }

    /// Creates a new gateway with an existing provider.
    pub fn with_provider(signer: DynSigner, provider: DynProvider) -> Self {
        let address = signer.address();
        Self { provider, wallet: EthereumWallet::new(signer.0), address }
    }
}

#[async_trait]
impl SigningGateway for LocalSigningGateway {
    async fn address(
        &self,
        _session: &SigningSession,
        _chain: &ChainConfig,
    ) -> Result<Address, GatewayError> {
        Ok(self.address)
    }

    async fn submit(
        &self,
        _session: &SigningSession,
        chain: &ChainConfig,
        tx: UnsignedTransaction,
    ) -> Result<B256, GatewayError> {
        if tx.chain_id != chain.chain_id {
            return Err(GatewayError::Message(format!(
                "transaction for chain {} cannot be sent on chain {}",
                tx.chain_id, chain.chain_id
            )));
        }

        let tx = TypedTransaction::Eip1559(TxEip1559::from(tx));
        let signed =
            NetworkWallet::<Ethereum>::sign_transaction_from(&self.wallet, self.address, tx)
                .await
                .map_err(|err| GatewayError::Message(err.to_string()))?;

        let pending = self
            .provider
            .send_raw_transaction(&signed.encoded_2718())
            .await
            .map_err(GatewayError::from_rpc)?;

        let hash = *pending.tx_hash();
        debug!(%hash, chain = %chain.name, "Broadcast locally signed transaction");
        Ok(hash)
    }
}
