//! The transaction pipeline.
//!
//! One invocation runs through the following phases, strictly in order:
//!
//! ```text
//! Idle -> ValidatingAuth -> ResolvingAddress -> [PreflightChecking -> AllowanceChecking
//!      -> (ApprovalPending)] -> BuildingMainTransaction -> Submitting -> Confirmed
//! ```
//!
//! The bracketed phases only run for operations that spend the position token. Any phase may
//! move to `Failed`. An approval is always broadcast before the main transaction is built, the
//! main transaction spends the allowance the approval grants.

mod attempt;
pub use attempt::{Phase, PipelineAttempt};

mod metrics;
pub use metrics::PipelineMetrics;

use crate::{
    backend::TransactionBackend,
    cache::{CacheInvalidator, CacheKey},
    config::{ChainConfig, PipelineConfig, PreflightConfig},
    error::{ActionableError, Failure, GatewayError, PipelineError, classify, matching_rule},
    factory::UnsignedTransactionFactory,
    gateway::SigningGateway,
    lock::{LockKey, TransactionLock},
    preflight::{AllowanceChecker, ApprovalCheck, ApprovalRequest, ChainBalanceReader},
    types::{OperationParams, SigningSession},
};
use alloy::primitives::{Address, B256};
use rust_decimal::Decimal;
use std::{fmt, sync::Arc};
use tracing::{debug, info, instrument, warn};

/// Sequences preflight checks, approval and submission of market transactions.
///
/// Holds no state between invocations. Concurrent invocations are independent, including
/// identical ones; see [`TransactionLock`] for deduplication.
pub struct TransactionOrchestrator {
    chain: ChainConfig,
    preflight: PreflightConfig,
    balances: ChainBalanceReader,
    allowance: AllowanceChecker,
    factory: UnsignedTransactionFactory,
    gateway: Arc<dyn SigningGateway>,
    cache: Arc<dyn CacheInvalidator>,
    lock: Option<Arc<dyn TransactionLock>>,
    metrics: PipelineMetrics,
}

impl fmt::Debug for TransactionOrchestrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransactionOrchestrator")
            .field("chain", &self.chain)
            .field("preflight", &self.preflight)
            .field("gateway", &self.gateway)
            .field("lock", &self.lock)
            .finish_non_exhaustive()
    }
}

impl TransactionOrchestrator {
    /// Creates a new [`TransactionOrchestrator`].
    pub fn new(
        config: &PipelineConfig,
        backend: Arc<dyn TransactionBackend>,
        gateway: Arc<dyn SigningGateway>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            chain: config.chain.clone(),
            preflight: config.preflight.clone(),
            balances: ChainBalanceReader::new(backend.clone(), &config.preflight.position_token),
            allowance: AllowanceChecker::new(backend.clone()),
            factory: UnsignedTransactionFactory::new(backend),
            gateway,
            cache,
            lock: None,
            metrics: PipelineMetrics::default(),
        }
    }

    /// Installs a [`TransactionLock`] consulted before every attempt.
    pub fn with_lock(mut self, lock: Arc<dyn TransactionLock>) -> Self {
        self.lock = Some(lock);
        self
    }

    /// Returns the chain the orchestrator sends transactions on.
    pub const fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Executes an operation and returns the hash of its transaction.
    pub async fn execute(
        &self,
        session: &SigningSession,
        params: OperationParams,
    ) -> Result<B256, PipelineError> {
        self.attempt(session, params).await.into_result()
    }

    /// Executes an operation and returns the finished [`PipelineAttempt`].
    #[instrument(skip_all, fields(operation = %params.operation()))]
    pub async fn attempt(
        &self,
        session: &SigningSession,
        params: OperationParams,
    ) -> PipelineAttempt {
        self.metrics.attempts.increment(1);
        let mut attempt = PipelineAttempt::new(params);

        match self.run(session, &mut attempt).await {
            Ok(tx_hash) => {
                self.metrics.confirmed.increment(1);
                info!(%tx_hash, "Transaction submitted");
                attempt.confirm(tx_hash);
            }
            Err(failure) => {
                if let Failure::Raw(err) = &failure {
                    debug!(%err, rule = matching_rule(err), "Classifying failure");
                }
                let err = classify(failure);
                self.metrics.failed.increment(1);
                warn!(phase = %attempt.phase(), kind = %err.kind(), %err, "Transaction failed");
                attempt.fail(err);
            }
        }

        attempt
    }

    async fn run(
        &self,
        session: &SigningSession,
        attempt: &mut PipelineAttempt,
    ) -> Result<B256, Failure> {
        attempt.advance(Phase::ValidatingAuth);
        if !session.is_valid() {
            return Err(PipelineError::Unauthenticated.into());
        }
        attempt.params().validate()?;

        attempt.advance(Phase::ResolvingAddress);
        let address = self.gateway.address(session, &self.chain).await?;
        if let Some(lock) = &self.lock {
            let key = LockKey::new(attempt.params(), address, self.preflight.position_symbol());
            lock.check(&key).map_err(PipelineError::TransactionLocked)?;
        }

        if let Some(amount) = attempt.params().spend_amount() {
            attempt.advance(Phase::PreflightChecking);
            self.check_balances(address, amount).await?;

            attempt.advance(Phase::AllowanceChecking);
            if let Some(request) = self.check_allowance(address, amount).await {
                attempt.advance(Phase::ApprovalPending);
                self.approve(session, &request).await?;
            }
        }

        attempt.advance(Phase::BuildingMainTransaction);
        let tx = self.factory.operation(address, attempt.params()).await?;

        attempt.advance(Phase::Submitting);
        let tx_hash = self.gateway.submit(session, &self.chain, tx).await?;

        for key in CacheKey::invalidated_by(attempt.params()) {
            self.cache.invalidate(&key);
        }

        Ok(tx_hash)
    }

    /// Fails when the balances are known to be too low. A failed read lets the attempt proceed.
    async fn check_balances(&self, address: Address, amount: Decimal) -> Result<(), PipelineError> {
        let balances = match self.balances.balances(address, &self.chain).await {
            Ok(balances) => balances,
            Err(err) => {
                self.metrics.soft_failures.increment(1);
                warn!(%address, %err, "Failed to read balances, skipping balance check");
                return Ok(());
            }
        };

        if balances.native_gas < self.preflight.min_native_gas {
            return Err(PipelineError::InsufficientGas {
                symbol: self.chain.native_symbol.to_uppercase(),
                balance: balances.native_gas,
                required: self.preflight.min_native_gas,
            });
        }

        if balances.position_token < amount {
            let symbol = self.preflight.position_symbol();
            return Err(PipelineError::InsufficientFunds(ActionableError::navigate(
                format!(
                    "Insufficient {symbol} balance: you have {}, need {amount}",
                    balances.position_token
                ),
                self.preflight.swap_route.clone(),
                format!("Get {symbol}"),
            )));
        }

        Ok(())
    }

    /// Returns the approval that has to land first, if any. A failed read assumes none.
    async fn check_allowance(&self, address: Address, amount: Decimal) -> Option<ApprovalRequest> {
        match self.allowance.check(address, amount).await {
            Ok(ApprovalCheck::Required(request)) => Some(request),
            Ok(ApprovalCheck::Sufficient) => None,
            Err(err) => {
                self.metrics.soft_failures.increment(1);
                warn!(%address, %err, "Failed to read allowance, proceeding without approval");
                None
            }
        }
    }

    /// Builds and submits the approval, waiting for the signer to broadcast it.
    async fn approve(
        &self,
        session: &SigningSession,
        request: &ApprovalRequest,
    ) -> Result<(), PipelineError> {
        let failed = |err: GatewayError| PipelineError::ApprovalFailed(Box::new(classify(err)));

        let tx = self.factory.approval(request).await.map_err(failed)?;
        let tx_hash = self.gateway.submit(session, &self.chain, tx).await.map_err(failed)?;

        self.metrics.approvals.increment(1);
        info!(%tx_hash, amount = %request.amount(), "Approval submitted");
        Ok(())
    }
}
