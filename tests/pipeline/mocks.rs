use alloy::primitives::{Address, B256, U256};
use async_trait::async_trait;
use market_tx::{
    backend::TransactionBackend,
    cache::{CacheInvalidator, CacheKey},
    config::ChainConfig,
    error::GatewayError,
    gateway::SigningGateway,
    lock::{LockKey, TransactionLock},
    types::{BuildRequest, SigningSession, TokenBalance, TransactionKind, UnsignedTransaction},
};
use rust_decimal::Decimal;
use std::sync::{Arc, Mutex};

/// The account every mock session resolves to.
pub const ACCOUNT: Address = Address::with_last_byte(0xaa);
/// Target of approval transactions.
pub const TOKEN: Address = Address::with_last_byte(0x01);
/// Target of operation transactions.
pub const MARKET: Address = Address::with_last_byte(0x02);

pub const APPROVAL_HASH: B256 = B256::with_last_byte(0x0a);
pub const MAIN_HASH: B256 = B256::with_last_byte(0x0b);

/// Ordered log of every call made to a collaborator.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    fn push(&self, call: impl Into<String>) {
        self.0.lock().unwrap().push(call.into());
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn matching(&self, prefix: &str) -> Vec<String> {
        self.calls().into_iter().filter(|call| call.starts_with(prefix)).collect()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.matching(prefix).len()
    }
}

pub fn unsigned(to: Address, nonce: u64) -> UnsignedTransaction {
    UnsignedTransaction {
        to,
        data: Default::default(),
        value: U256::ZERO,
        gas_limit: 100_000,
        max_fee_per_gas: 1_000_000_000,
        max_priority_fee_per_gas: 1_000_000,
        nonce,
        chain_id: 8453,
    }
}

pub fn balance(token: &str, chain_name: &str, amount: Decimal) -> TokenBalance {
    TokenBalance { token: token.to_string(), chain_name: chain_name.to_string(), amount }
}

#[derive(Debug)]
pub struct MockBackend {
    pub log: CallLog,
    pub balances: Result<Vec<TokenBalance>, GatewayError>,
    pub allowance: Result<Option<UnsignedTransaction>, GatewayError>,
    pub approval_build: Result<UnsignedTransaction, GatewayError>,
    pub main_build: Result<UnsignedTransaction, GatewayError>,
}

impl MockBackend {
    /// A backend reporting plenty of funds and a sufficient allowance.
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            balances: Ok(vec![
                balance("ETH", "base", Decimal::ONE),
                balance("rETH Token", "base", Decimal::from(100)),
            ]),
            allowance: Ok(None),
            approval_build: Ok(unsigned(TOKEN, 0)),
            main_build: Ok(unsigned(MARKET, 1)),
        }
    }
}

#[async_trait]
impl TransactionBackend for MockBackend {
    async fn token_balances(&self, address: Address) -> Result<Vec<TokenBalance>, GatewayError> {
        assert_eq!(address, ACCOUNT);
        self.log.push("balances");
        self.balances.clone()
    }

    async fn allowance_transaction(
        &self,
        address: Address,
        amount: Decimal,
    ) -> Result<Option<UnsignedTransaction>, GatewayError> {
        assert_eq!(address, ACCOUNT);
        self.log.push(format!("allowance:{amount}"));
        self.allowance.clone()
    }

    async fn build_transaction(
        &self,
        request: &BuildRequest,
    ) -> Result<UnsignedTransaction, GatewayError> {
        assert_eq!(request.address, ACCOUNT);
        match &request.kind {
            TransactionKind::Approve { amount } => {
                self.log.push(format!("build:approve:{amount}"));
                self.approval_build.clone()
            }
            kind => {
                self.log.push(format!("build:{}", kind.endpoint()));
                self.main_build.clone()
            }
        }
    }
}

#[derive(Debug)]
pub struct MockGateway {
    pub log: CallLog,
    pub address: Result<Address, GatewayError>,
    pub approval_submit: Result<B256, GatewayError>,
    pub main_submit: Result<B256, GatewayError>,
}

impl MockGateway {
    pub fn new(log: CallLog) -> Self {
        Self {
            log,
            address: Ok(ACCOUNT),
            approval_submit: Ok(APPROVAL_HASH),
            main_submit: Ok(MAIN_HASH),
        }
    }
}

#[async_trait]
impl SigningGateway for MockGateway {
    async fn address(
        &self,
        _session: &SigningSession,
        _chain: &ChainConfig,
    ) -> Result<Address, GatewayError> {
        self.log.push("address");
        self.address.clone()
    }

    async fn submit(
        &self,
        _session: &SigningSession,
        _chain: &ChainConfig,
        tx: UnsignedTransaction,
    ) -> Result<B256, GatewayError> {
        if tx.to == TOKEN {
            self.log.push("submit:approve");
            self.approval_submit.clone()
        } else {
            self.log.push("submit:main");
            self.main_submit.clone()
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingCache {
    keys: Mutex<Vec<CacheKey>>,
}

impl RecordingCache {
    pub fn keys(&self) -> Vec<CacheKey> {
        self.keys.lock().unwrap().clone()
    }
}

impl CacheInvalidator for RecordingCache {
    fn invalidate(&self, key: &CacheKey) {
        self.keys.lock().unwrap().push(key.clone());
    }
}

/// Rejects every attempt, recording the keys it saw.
#[derive(Debug, Default)]
pub struct VetoLock {
    keys: Mutex<Vec<LockKey>>,
}

impl VetoLock {
    pub fn keys(&self) -> Vec<LockKey> {
        self.keys.lock().unwrap().clone()
    }
}

impl TransactionLock for VetoLock {
    fn check(&self, key: &LockKey) -> Result<(), String> {
        self.keys.lock().unwrap().push(key.clone());
        Err("A transaction for this position is already in progress".to_string())
    }
}
