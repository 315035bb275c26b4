#![allow(missing_docs)]

mod mocks;

use market_tx::{
    cache::CacheKey,
    config::PipelineConfig,
    error::{Boundary, ErrorAction, ErrorKind, GatewayError, PipelineError},
    lock::LockKey,
    orchestrator::{Phase, TransactionOrchestrator},
    preflight::AllowanceChecker,
    types::{Operation, OperationParams, Position, SigningSession},
};
use mocks::{
    ACCOUNT, APPROVAL_HASH, CallLog, MAIN_HASH, MockBackend, MockGateway, RecordingCache, TOKEN,
    VetoLock, balance, unsigned,
};
use rust_decimal::Decimal;
use std::{sync::Arc, time::Duration};

struct Harness {
    orchestrator: TransactionOrchestrator,
    log: CallLog,
    cache: Arc<RecordingCache>,
}

fn setup(configure: impl FnOnce(&mut MockBackend, &mut MockGateway)) -> Harness {
    let log = CallLog::default();
    let mut backend = MockBackend::new(log.clone());
    let mut gateway = MockGateway::new(log.clone());
    configure(&mut backend, &mut gateway);

    let cache = Arc::new(RecordingCache::default());
    let orchestrator = TransactionOrchestrator::new(
        &PipelineConfig::default(),
        Arc::new(backend),
        Arc::new(gateway),
        cache.clone(),
    );
    Harness { orchestrator, log, cache }
}

fn session() -> SigningSession {
    SigningSession::new("session-token")
}

fn stake(amount: i64) -> OperationParams {
    OperationParams::Stake {
        market_id: "m1".to_string(),
        position: Position::Yes,
        amount: Decimal::from(amount),
    }
}

#[tokio::test]
async fn stake_confirms_and_invalidates() {
    let harness = setup(|_, _| {});
    let params = stake(10);

    let tx_hash = harness.orchestrator.execute(&session(), params.clone()).await.unwrap();

    assert_eq!(tx_hash, MAIN_HASH);
    assert_eq!(
        harness.log.calls(),
        ["address", "balances", "allowance:10", "build:stake", "submit:main"]
    );

    let keys = harness.cache.keys();
    assert_eq!(keys, CacheKey::invalidated_by(&params));
    assert!(keys.contains(&CacheKey::Markets));
    assert!(keys.contains(&CacheKey::UserPositions));
    assert!(keys.contains(&CacheKey::UserStats));
    assert!(keys.contains(&CacheKey::Listings { market_id: Some("m1".to_string()) }));
}

#[tokio::test]
async fn attempt_records_phases() {
    let harness = setup(|_, _| {});

    let attempt = harness.orchestrator.attempt(&session(), stake(10)).await;

    assert_eq!(attempt.phase(), Phase::Confirmed);
    assert_eq!(attempt.tx_hash(), Some(MAIN_HASH));
    assert_eq!(
        attempt.history(),
        [
            Phase::Idle,
            Phase::ValidatingAuth,
            Phase::ResolvingAddress,
            Phase::PreflightChecking,
            Phase::AllowanceChecking,
            Phase::BuildingMainTransaction,
            Phase::Submitting,
            Phase::Confirmed,
        ]
    );
    assert!(!attempt.visited(Phase::ApprovalPending));
}

#[tokio::test]
async fn unauthenticated_before_any_call() {
    let harness = setup(|_, _| {});

    let blank = SigningSession::new("  ");

    let err = harness.orchestrator.execute(&blank, stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Unauthenticated);
    assert_eq!(err.to_string(), "Please sign in to continue");
    assert!(harness.log.calls().is_empty());
    assert!(harness.cache.keys().is_empty());
}

#[tokio::test]
async fn expired_session_is_unauthenticated() {
    let harness = setup(|_, _| {});
    let expired = session().with_expiry(chrono::Utc::now() - chrono::Duration::minutes(1));

    let attempt = harness.orchestrator.attempt(&expired, stake(10)).await;

    assert_eq!(attempt.phase(), Phase::Failed);
    assert_eq!(attempt.error().map(PipelineError::kind), Some(ErrorKind::Unauthenticated));
    assert!(!attempt.visited(Phase::ResolvingAddress));
}

#[tokio::test]
async fn invalid_params_fail_before_any_call() {
    let harness = setup(|_, _| {});

    let err = harness.orchestrator.execute(&session(), stake(0)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InvalidParameter);
    assert!(harness.log.calls().is_empty());
}

#[tokio::test]
async fn insufficient_gas_stops_before_building() {
    let harness = setup(|backend, _| {
        backend.balances = Ok(vec![
            balance("ETH", "base", Decimal::new(5, 5)),
            balance("rETH", "base", Decimal::from(100)),
        ]);
    });

    let err = harness.orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientGas);
    assert_eq!(
        err.to_string(),
        "Insufficient ETH for gas fees: balance 0.00005, need at least 0.0001"
    );
    assert!(!err.is_actionable());
    assert_eq!(harness.log.calls(), ["address", "balances"]);
    assert!(harness.cache.keys().is_empty());
}

#[tokio::test]
async fn native_balance_on_other_chain_does_not_count() {
    let harness = setup(|backend, _| {
        backend.balances = Ok(vec![
            balance("ETH", "ethereum", Decimal::from(3)),
            balance("rETH", "base", Decimal::from(100)),
        ]);
    });

    let err = harness.orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientGas);
}

#[tokio::test]
async fn insufficient_funds_is_actionable() {
    let harness = setup(|backend, _| {
        backend.balances = Ok(vec![
            balance("ETH", "base", Decimal::ONE),
            balance("rETH", "base", Decimal::from(5)),
        ]);
    });

    let err = harness.orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(err.to_string(), "Insufficient RETH balance: you have 5, need 10");
    assert_eq!(
        err.action(),
        Some(&ErrorAction::Navigate { target: "/swap".to_string(), label: "Get RETH".to_string() })
    );
    assert_eq!(harness.log.calls(), ["address", "balances"]);
}

#[tokio::test]
async fn approval_lands_before_main_transaction() {
    let harness = setup(|backend, _| {
        backend.allowance = Ok(Some(unsigned(TOKEN, 0)));
    });

    let attempt = harness.orchestrator.attempt(&session(), stake(10)).await;

    assert_eq!(attempt.tx_hash(), Some(MAIN_HASH));
    assert_ne!(attempt.tx_hash(), Some(APPROVAL_HASH));
    assert!(attempt.visited(Phase::ApprovalPending));
    assert_eq!(
        harness.log.calls(),
        [
            "address",
            "balances",
            "allowance:10",
            "build:approve:10",
            "submit:approve",
            "build:stake",
            "submit:main",
        ]
    );
}

#[tokio::test]
async fn failed_approval_skips_main_transaction() {
    let harness = setup(|backend, gateway| {
        backend.allowance = Ok(Some(unsigned(TOKEN, 0)));
        gateway.approval_submit = Err(GatewayError::Message("User rejected the request".into()));
    });

    let err = harness.orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ApprovalFailed);
    assert_eq!(err.to_string(), "Token approval transaction failed: User rejected the request");
    assert_eq!(harness.log.count("build:stake"), 0);
    assert_eq!(harness.log.count("submit:main"), 0);
    assert!(harness.cache.keys().is_empty());
}

#[tokio::test]
async fn failed_approval_build_is_approval_failure() {
    let harness = setup(|backend, _| {
        backend.allowance = Ok(Some(unsigned(TOKEN, 0)));
        backend.approval_build = Err(GatewayError::Transport("connection refused".into()));
    });

    let err = harness.orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    let PipelineError::ApprovalFailed(inner) = err else { panic!("expected approval failure") };
    assert_eq!(inner.kind(), ErrorKind::NetworkError);
    assert_eq!(harness.log.count("submit:"), 0);
}

#[tokio::test]
async fn reverted_main_transaction() {
    let harness = setup(|_, gateway| {
        gateway.main_submit =
            Err(GatewayError::Message("execution reverted: insufficient balance".into()));
    });

    let err = harness.orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::ChainRevert);
    assert!(err.to_string().contains("insufficient balance"));
    assert!(harness.cache.keys().is_empty());
}

#[tokio::test]
async fn approved_stake_reverts_on_submission() {
    let harness = setup(|backend, gateway| {
        backend.allowance = Ok(Some(unsigned(TOKEN, 0)));
        gateway.main_submit =
            Err(GatewayError::Message("execution reverted: insufficient balance".into()));
    });

    let attempt = harness.orchestrator.attempt(&session(), stake(10)).await;

    assert!(attempt.visited(Phase::ApprovalPending));
    assert_eq!(attempt.phase(), Phase::Failed);
    let err = attempt.error().unwrap();
    assert_eq!(err.kind(), ErrorKind::ChainRevert);
    assert_eq!(err.to_string(), "Transaction reverted: execution reverted: insufficient balance");
    assert_eq!(
        harness.log.calls(),
        [
            "address",
            "balances",
            "allowance:10",
            "build:approve:10",
            "submit:approve",
            "build:stake",
            "submit:main",
        ]
    );
    assert!(harness.cache.keys().is_empty());
}

#[tokio::test]
async fn signer_internal_error_is_gas_estimation() {
    let harness = setup(|_, gateway| {
        gateway.main_submit = Err(GatewayError::http(Boundary::Signer, 500, "boom"));
    });

    let err = harness.orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::GasEstimationFailure);
    assert_eq!(err.to_string(), "Insufficient gas for fees");
}

#[tokio::test]
async fn unreadable_balances_and_allowance_proceed() {
    let harness = setup(|backend, _| {
        backend.balances = Err(GatewayError::Transport("timeout".into()));
        backend.allowance = Err(GatewayError::http(Boundary::Backend, 503, "unavailable"));
    });

    let tx_hash = harness.orchestrator.execute(&session(), stake(10)).await.unwrap();

    assert_eq!(tx_hash, MAIN_HASH);
    assert_eq!(harness.log.count("build:approve"), 0);
    assert_eq!(harness.log.count("build:stake"), 1);
}

#[tokio::test]
async fn address_failure_is_classified() {
    let harness = setup(|_, gateway| {
        gateway.address = Err(GatewayError::Transport("Failed to fetch".into()));
    });

    let attempt = harness.orchestrator.attempt(&session(), stake(10)).await;

    assert_eq!(attempt.error().map(PipelineError::kind), Some(ErrorKind::NetworkError));
    assert!(!attempt.visited(Phase::PreflightChecking));
}

#[tokio::test]
async fn operations_without_value_skip_preflight() {
    let harness = setup(|backend, _| {
        backend.balances = Ok(Vec::new());
    });
    let params = [
        OperationParams::Claim { market_id: "m1".into() },
        OperationParams::CreateListing {
            market_id: "m1".into(),
            ask_price: Decimal::from(2),
            duration: Duration::from_secs(3600),
        },
        OperationParams::EarlyExit { market_id: "m1".into() },
        OperationParams::ClaimPayout { market_id: "m1".into() },
    ];

    for params in params {
        harness.orchestrator.execute(&session(), params).await.unwrap();
    }

    assert_eq!(harness.log.count("balances"), 0);
    assert_eq!(harness.log.count("allowance"), 0);
    assert_eq!(
        harness.log.matching("build:"),
        ["build:claim", "build:create-listing", "build:early-exit", "build:claim-payout"]
    );
}

#[tokio::test]
async fn purchase_listing_checks_price() {
    let harness = setup(|_, _| {});
    let params = OperationParams::PurchaseListing {
        listing_id: "l1".into(),
        price: Decimal::from(150),
    };

    let err = harness.orchestrator.execute(&session(), params).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(harness.log.count("build:"), 0);
}

#[tokio::test]
async fn purchase_listing_invalidates_every_listing() {
    let harness = setup(|_, _| {});
    let params =
        OperationParams::PurchaseListing { listing_id: "l1".into(), price: Decimal::from(1) };

    harness.orchestrator.execute(&session(), params).await.unwrap();

    assert!(harness.cache.keys().contains(&CacheKey::Listings { market_id: None }));
}

#[tokio::test]
async fn lock_veto_stops_attempt() {
    let log = CallLog::default();
    let lock = Arc::new(VetoLock::default());
    let orchestrator = TransactionOrchestrator::new(
        &PipelineConfig::default(),
        Arc::new(MockBackend::new(log.clone())),
        Arc::new(MockGateway::new(log.clone())),
        Arc::new(RecordingCache::default()),
    )
    .with_lock(lock.clone());

    let err = orchestrator.execute(&session(), stake(10)).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::TransactionLocked);
    assert_eq!(log.calls(), ["address"]);
    assert_eq!(
        lock.keys(),
        [LockKey {
            operation: Operation::Stake,
            amount: Some(Decimal::from(10)),
            recipient: ACCOUNT,
            currency: "RETH".to_string(),
        }]
    );
}

#[tokio::test]
async fn needs_approval_is_idempotent() {
    let log = CallLog::default();
    let mut backend = MockBackend::new(log.clone());
    backend.allowance = Ok(Some(unsigned(TOKEN, 0)));
    let checker = AllowanceChecker::new(Arc::new(backend));

    let first = checker.needs_approval(ACCOUNT, Decimal::from(10)).await.unwrap();
    let second = checker.needs_approval(ACCOUNT, Decimal::from(10)).await.unwrap();

    assert!(first);
    assert_eq!(first, second);
    assert_eq!(log.calls(), ["allowance:10", "allowance:10"]);
}

#[tokio::test]
async fn concurrent_attempts_are_independent() {
    let harness = setup(|_, _| {});
    let (first, second) = (session(), session());

    let (a, b) = tokio::join!(
        harness.orchestrator.execute(&first, stake(10)),
        harness.orchestrator.execute(&second, stake(10)),
    );

    assert_eq!(a.unwrap(), MAIN_HASH);
    assert_eq!(b.unwrap(), MAIN_HASH);
    assert_eq!(harness.log.count("submit:main"), 2);
}
