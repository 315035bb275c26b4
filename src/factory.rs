//! Construction of unsigned transactions.

use crate::{
    backend::TransactionBackend,
    error::GatewayError,
    preflight::ApprovalRequest,
    types::{BuildRequest, OperationParams, UnsignedTransaction},
};
use alloy::primitives::Address;
use std::sync::Arc;
use tracing::debug;

/// Asks the backend for unsigned transactions.
#[derive(Debug, Clone)]
pub struct UnsignedTransactionFactory {
    backend: Arc<dyn TransactionBackend>,
}

impl UnsignedTransactionFactory {
    /// Creates a new [`UnsignedTransactionFactory`].
    pub fn new(backend: Arc<dyn TransactionBackend>) -> Self {
        Self { backend }
    }

    /// Builds the transaction described by `request`.
    pub async fn build(&self, request: BuildRequest) -> Result<UnsignedTransaction, GatewayError> {
        let tx = self.backend.build_transaction(&request).await?;
        debug!(
            kind = request.kind.endpoint(),
            address = %request.address,
            to = %tx.to,
            nonce = tx.nonce,
            "Built unsigned transaction"
        );
        Ok(tx)
    }

    /// Builds the approval transaction for `request`.
    pub async fn approval(
        &self,
        request: &ApprovalRequest,
    ) -> Result<UnsignedTransaction, GatewayError> {
        self.build(BuildRequest::approval(request)).await
    }

    /// Builds the main transaction of an operation sent from `address`.
    pub async fn operation(
        &self,
        address: Address,
        params: &OperationParams,
    ) -> Result<UnsignedTransaction, GatewayError> {
        self.build(BuildRequest::operation(address, params.clone())).await
    }
}
