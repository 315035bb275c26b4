use super::{Operation, OperationParams};
use crate::preflight::ApprovalRequest;
use alloy::{
    consensus::TxEip1559,
    primitives::{Address, Bytes, ChainId, U256},
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A fully specified transaction that has not been signed yet.
///
/// Produced by the backend and handed to a
/// [`SigningGateway`](crate::gateway::SigningGateway) exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    /// Destination contract.
    pub to: Address,
    /// Calldata.
    #[serde(default)]
    pub data: Bytes,
    /// Native value attached to the call.
    #[serde(default)]
    pub value: U256,
    /// Gas limit.
    #[serde(with = "alloy::serde::quantity")]
    pub gas_limit: u64,
    /// EIP-1559 max fee per gas.
    #[serde(with = "alloy::serde::quantity")]
    pub max_fee_per_gas: u128,
    /// EIP-1559 max priority fee per gas.
    #[serde(with = "alloy::serde::quantity")]
    pub max_priority_fee_per_gas: u128,
    /// Nonce of the sending account.
    #[serde(with = "alloy::serde::quantity")]
    pub nonce: u64,
    /// Chain the transaction is valid on.
    #[serde(with = "alloy::serde::quantity")]
    pub chain_id: ChainId,
}

impl From<UnsignedTransaction> for TxEip1559 {
    fn from(tx: UnsignedTransaction) -> Self {
        Self {
            chain_id: tx.chain_id,
            nonce: tx.nonce,
            gas_limit: tx.gas_limit,
            max_fee_per_gas: tx.max_fee_per_gas,
            max_priority_fee_per_gas: tx.max_priority_fee_per_gas,
            to: tx.to.into(),
            value: tx.value,
            access_list: Default::default(),
            input: tx.data,
        }
    }
}

/// What the backend is asked to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    /// ERC-20 approval of the position token for `amount`.
    Approve {
        /// Amount to approve.
        amount: Decimal,
    },
    /// The main transaction of an operation.
    Operation(OperationParams),
}

impl TransactionKind {
    /// Returns the endpoint name of this kind.
    pub const fn endpoint(&self) -> &'static str {
        match self {
            Self::Approve { .. } => "approve",
            Self::Operation(params) => params.operation().as_str(),
        }
    }

    /// Returns the operation, if this is a main transaction.
    pub const fn operation(&self) -> Option<Operation> {
        match self {
            Self::Approve { .. } => None,
            Self::Operation(params) => Some(params.operation()),
        }
    }
}

/// Request to construct an [`UnsignedTransaction`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Account the transaction is sent from.
    pub address: Address,
    /// What to build.
    pub kind: TransactionKind,
}

impl BuildRequest {
    /// Request for the approval described by `request`.
    ///
    /// The approved amount and account are taken from the allowance check verbatim.
    pub fn approval(request: &ApprovalRequest) -> Self {
        let kind = TransactionKind::Approve { amount: request.amount() };
        Self { address: request.address(), kind }
    }

    /// Request for the main transaction of an operation.
    pub fn operation(address: Address, params: OperationParams) -> Self {
        Self { address, kind: TransactionKind::Operation(params) }
    }
}
