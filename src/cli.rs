//! # Market Tx CLI
use crate::{
    backend::HttpBackend,
    cache::QueryCache,
    config::PipelineConfig,
    error::ErrorAction,
    gateway::{HttpSigningGateway, LocalSigningGateway, SigningGateway},
    orchestrator::TransactionOrchestrator,
    signers::DynSigner,
    types::{Operation, OperationParams, Position, RawOperationParams, SigningSession},
};
use clap::{Parser, Subcommand};
use eyre::OptionExt;
use rust_decimal::Decimal;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::info;
use url::Url;

/// Submits prediction market transactions through a signing gateway.
#[derive(Debug, Parser)]
#[command(author, about = "Market transaction pipeline", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be used and stored in the working directory under
    /// `market-tx.yaml`.
    #[arg(long, value_name = "CONFIG", env = "MARKET_TX_CONFIG", default_value = "market-tx.yaml")]
    pub config: PathBuf,
    /// Base URL of the transaction backend.
    #[arg(long = "backend-url", value_name = "URL")]
    pub backend_url: Option<Url>,
    /// Base URL of the signing gateway.
    #[arg(long = "signer-url", value_name = "URL")]
    pub signer_url: Option<Url>,
    /// The RPC endpoint of the chain, used when signing with a local key.
    #[arg(long = "chain-endpoint", value_name = "RPC_ENDPOINT")]
    pub chain_endpoint: Option<Url>,
    /// The session token to sign with.
    ///
    /// Not needed when signing with a local key.
    #[arg(
        long = "session-token",
        value_name = "TOKEN",
        env = "MARKET_TX_SESSION",
        required_unless_present("signer_key")
    )]
    pub session_token: Option<String>,
    /// Signs with a local secret key instead of the signing gateway.
    ///
    /// Requires a chain endpoint. Holding the key authorizes the session, so no session token
    /// is needed.
    #[arg(long = "signer-key", value_name = "SECRET_KEY", env = "MARKET_TX_SIGNER_KEY")]
    pub signer_key: Option<String>,
    /// The minimum native balance required to pay for gas.
    #[arg(long = "min-native-gas", value_name = "AMOUNT")]
    pub min_native_gas: Option<Decimal>,
    /// The operation to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Operations the CLI can execute.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Stake on a market outcome.
    Stake {
        /// The market to stake on.
        market_id: String,
        /// The outcome to back.
        position: Position,
        /// The amount of the position token to stake.
        amount: Decimal,
    },
    /// Claim winnings of a resolved market.
    Claim {
        /// The market to claim from.
        market_id: String,
    },
    /// List a position for sale.
    CreateListing {
        /// The market of the position.
        market_id: String,
        /// The asking price.
        ask_price: Decimal,
        /// How long the listing stays open.
        #[arg(long, value_name = "SECONDS", value_parser = parse_duration_secs, default_value = "86400")]
        duration: Duration,
    },
    /// Buy a listed position.
    PurchaseListing {
        /// The listing to buy.
        listing_id: String,
        /// The price of the listing.
        price: Decimal,
    },
    /// Exit a position before the market resolves.
    EarlyExit {
        /// The market to exit.
        market_id: String,
    },
    /// Claim the payout of a resolved market.
    ClaimPayout {
        /// The market to claim from.
        market_id: String,
    },
    /// Execute an operation given as a JSON parameter object.
    Json {
        /// The operation to execute.
        operation: Operation,
        /// The parameters, e.g. `{"marketId":"m1","position":"YES","amount":"10"}`.
        params: String,
    },
}

impl Command {
    /// Returns the parameters of the operation.
    pub fn into_params(self) -> eyre::Result<OperationParams> {
        Ok(match self {
            Self::Stake { market_id, position, amount } => {
                OperationParams::Stake { market_id, position, amount }
            }
            Self::Claim { market_id } => OperationParams::Claim { market_id },
            Self::CreateListing { market_id, ask_price, duration } => {
                OperationParams::CreateListing { market_id, ask_price, duration }
            }
            Self::PurchaseListing { listing_id, price } => {
                OperationParams::PurchaseListing { listing_id, price }
            }
            Self::EarlyExit { market_id } => OperationParams::EarlyExit { market_id },
            Self::ClaimPayout { market_id } => OperationParams::ClaimPayout { market_id },
            Self::Json { operation, params } => {
                let raw: RawOperationParams = serde_json::from_str(&params)?;
                OperationParams::from_raw(operation, raw)?
            }
        })
    }
}

impl Args {
    /// Executes the requested operation.
    pub async fn run(self) -> eyre::Result<()> {
        let config = if !self.config.exists() {
            let config = self.merge_pipeline_config(PipelineConfig::default());
            config.save_to_file(&self.config)?;
            config
        } else {
            // File exists: load and override with CLI values.
            self.merge_pipeline_config(PipelineConfig::load_from_file(&self.config)?)
        };

        let gateway: Arc<dyn SigningGateway> = match &self.signer_key {
            Some(key) => {
                let endpoint = config
                    .chain
                    .endpoint
                    .clone()
                    .ok_or_eyre("signing with a local key requires a chain endpoint")?;
                let signer = DynSigner::from_signing_key(key)?;
                info!(address = %signer.address(), "Signing with local key");
                Arc::new(LocalSigningGateway::new(signer, endpoint))
            }
            None => Arc::new(HttpSigningGateway::new(config.signer.url.clone())),
        };
        let backend = Arc::new(HttpBackend::new(config.backend.url.clone()));
        let orchestrator =
            TransactionOrchestrator::new(&config, backend, gateway, Arc::new(QueryCache::new()));

        let session = self.session();
        let params = self.command.into_params()?;

        match orchestrator.execute(&session, params).await {
            Ok(tx_hash) => {
                println!("{tx_hash}");
                Ok(())
            }
            Err(err) => {
                if let Some(ErrorAction::Navigate { target, label }) = err.action() {
                    eprintln!("{label}: {target}");
                }
                Err(eyre::eyre!("{err} ({})", err.kind()))
            }
        }
    }

    /// Returns the session to sign with.
    ///
    /// A local key stands in for a missing session token, the local gateway never consults it.
    pub fn session(&self) -> SigningSession {
        match (&self.session_token, &self.signer_key) {
            (Some(token), _) => SigningSession::new(token.clone()),
            (None, Some(_)) => SigningSession::new("local-key"),
            (None, None) => SigningSession::new(""),
        }
    }

    /// Overrides `config` with the values given on the command line.
    pub fn merge_pipeline_config(&self, config: PipelineConfig) -> PipelineConfig {
        config
            .with_backend_url(self.backend_url.clone())
            .with_signer_url(self.signer_url.clone())
            .with_chain_endpoint(self.chain_endpoint.clone())
            .with_min_native_gas(self.min_native_gas)
    }
}

/// Parses a string representing seconds to a [`Duration`].
fn parse_duration_secs(arg: &str) -> Result<Duration, std::num::ParseIntError> {
    let seconds = arg.parse()?;
    Ok(Duration::from_secs(seconds))
}
