//! Pipeline configuration.
use crate::constants::{
    DEFAULT_BACKEND_URL, DEFAULT_CHAIN_ID, DEFAULT_CHAIN_NAME, DEFAULT_NATIVE_SYMBOL,
    DEFAULT_POSITION_TOKEN, DEFAULT_SIGNER_URL, DEFAULT_SWAP_ROUTE, MIN_NATIVE_GAS_BALANCE,
};
use alloy::primitives::ChainId;
use eyre::Context;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Pipeline configuration.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Transaction backend configuration.
    #[serde(default)]
    pub backend: BackendConfig,
    /// Signing service configuration.
    #[serde(default)]
    pub signer: SignerConfig,
    /// Target chain.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Preflight thresholds.
    #[serde(default)]
    pub preflight: PreflightConfig,
}

impl PipelineConfig {
    /// Sets the backend URL.
    pub fn with_backend_url(mut self, url: Option<Url>) -> Self {
        if let Some(url) = url {
            self.backend.url = url;
        }
        self
    }

    /// Sets the signing service URL.
    pub fn with_signer_url(mut self, url: Option<Url>) -> Self {
        if let Some(url) = url {
            self.signer.url = url;
        }
        self
    }

    /// Sets the RPC endpoint of the chain, used by local signing.
    pub fn with_chain_endpoint(mut self, endpoint: Option<Url>) -> Self {
        if let Some(endpoint) = endpoint {
            self.chain.endpoint = Some(endpoint);
        }
        self
    }

    /// Sets the minimum native gas balance.
    pub fn with_min_native_gas(mut self, min_native_gas: Option<Decimal>) -> Self {
        if let Some(min_native_gas) = min_native_gas {
            self.preflight.min_native_gas = min_native_gas;
        }
        self
    }

    /// Sets the position token name.
    pub fn with_position_token(mut self, position_token: Option<String>) -> Self {
        if let Some(position_token) = position_token {
            self.preflight.position_token = position_token;
        }
        self
    }

    /// Load from a YAML file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> eyre::Result<Self> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)
            .wrap_err_with(|| format!("failed to read config file: {}", path.display()))?;
        let config = serde_yaml::from_reader(&file)
            .wrap_err_with(|| format!("failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save to a YAML file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> eyre::Result<()> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Transaction backend configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the backend REST API.
    pub url: Url,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self { url: Url::parse(DEFAULT_BACKEND_URL).expect("valid default backend url") }
    }
}

/// Signing service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerConfig {
    /// Base URL of the custodial signing service.
    pub url: Url,
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self { url: Url::parse(DEFAULT_SIGNER_URL).expect("valid default signer url") }
    }
}

/// The chain transactions are sent on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct ChainConfig {
    /// Chain name as reported in balance lists.
    pub name: String,
    /// Chain id.
    pub chain_id: ChainId,
    /// Symbol of the native gas asset.
    #[serde(default = "default_native_symbol")]
    pub native_symbol: String,
    /// JSON-RPC endpoint, only needed when signing locally.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Url>,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_CHAIN_NAME.to_string(),
            chain_id: DEFAULT_CHAIN_ID,
            native_symbol: default_native_symbol(),
            endpoint: None,
        }
    }
}

fn default_native_symbol() -> String {
    DEFAULT_NATIVE_SYMBOL.to_string()
}

/// Preflight thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreflightConfig {
    /// Name fragment of the position token in balance lists.
    pub position_token: String,
    /// Minimum native gas balance required before value-moving operations.
    pub min_native_gas: Decimal,
    /// Route suggested when the position token balance is too low.
    pub swap_route: String,
}

impl PreflightConfig {
    /// Symbol of the position token as shown to users.
    pub fn position_symbol(&self) -> String {
        self.position_token.to_uppercase()
    }
}

impl Default for PreflightConfig {
    fn default() -> Self {
        Self {
            position_token: DEFAULT_POSITION_TOKEN.to_string(),
            min_native_gas: MIN_NATIVE_GAS_BALANCE,
            swap_route: DEFAULT_SWAP_ROUTE.to_string(),
        }
    }
}
