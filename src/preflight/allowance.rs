use crate::{backend::TransactionBackend, error::GatewayError};
use alloy::primitives::Address;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::debug;

/// Outcome of an allowance check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApprovalCheck {
    /// The spender may already move the amount.
    Sufficient,
    /// An approval transaction has to land first.
    Required(ApprovalRequest),
}

impl ApprovalCheck {
    /// Whether an approval is required.
    pub const fn is_required(&self) -> bool {
        matches!(self, Self::Required(_))
    }
}

/// The approval an [`AllowanceChecker`] found missing.
///
/// Can only be produced by a check, so the approval that gets built always covers exactly the
/// account and amount that were checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApprovalRequest {
    address: Address,
    amount: Decimal,
}

impl ApprovalRequest {
    /// Account that grants the approval.
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Amount to approve.
    pub const fn amount(&self) -> Decimal {
        self.amount
    }
}

/// Checks whether the position token allowance covers an amount.
#[derive(Debug, Clone)]
pub struct AllowanceChecker {
    backend: Arc<dyn TransactionBackend>,
}

impl AllowanceChecker {
    /// Creates a new [`AllowanceChecker`].
    pub fn new(backend: Arc<dyn TransactionBackend>) -> Self {
        Self { backend }
    }

    /// Checks the allowance of `address` for `amount`.
    ///
    /// The backend answers with the approval transaction it would need, or nothing when the
    /// allowance is sufficient.
    pub async fn check(
        &self,
        address: Address,
        amount: Decimal,
    ) -> Result<ApprovalCheck, GatewayError> {
        let needed = self.backend.allowance_transaction(address, amount).await?;
        debug!(%address, %amount, required = needed.is_some(), "Checked allowance");

        Ok(match needed {
            Some(_) => ApprovalCheck::Required(ApprovalRequest { address, amount }),
            None => ApprovalCheck::Sufficient,
        })
    }

    /// Whether `address` needs to approve `amount` before spending it.
    pub async fn needs_approval(
        &self,
        address: Address,
        amount: Decimal,
    ) -> Result<bool, GatewayError> {
        Ok(self.check(address, amount).await?.is_required())
    }
}
