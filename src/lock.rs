//! Hook for the duplicate-submission guard.
//!
//! The pipeline itself never serializes invocations: two concurrent calls with the same
//! parameters both run to completion. Callers that can double-submit (a button pressed twice)
//! must install a [`TransactionLock`].

use crate::types::{Operation, OperationParams};
use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::fmt::Debug;

/// Identifies an attempt for deduplication purposes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockKey {
    /// Operation being attempted.
    pub operation: Operation,
    /// Amount moved, if any.
    pub amount: Option<Decimal>,
    /// Account the transaction is sent from.
    pub recipient: Address,
    /// Token the amount is denominated in.
    pub currency: String,
}

impl LockKey {
    /// Creates the key of an attempt.
    pub fn new(params: &OperationParams, recipient: Address, currency: impl Into<String>) -> Self {
        Self {
            operation: params.operation(),
            amount: params.spend_amount(),
            recipient,
            currency: currency.into(),
        }
    }
}

/// Pre-submission check that can veto an attempt.
pub trait TransactionLock: Debug + Send + Sync {
    /// Returns `Err` with a reason when the attempt must not start.
    fn check(&self, key: &LockKey) -> Result<(), String>;
}
