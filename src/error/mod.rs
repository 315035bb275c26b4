//! Pipeline error types.
use crate::types::Operation;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

mod actionable;
pub use actionable::{ActionableError, ErrorAction};

mod classify;
pub use classify::{Failure, classify, matching_rule};

mod gateway;
pub use gateway::{Boundary, GatewayError};

/// The error surfaced by
/// [`TransactionOrchestrator::execute`](crate::orchestrator::TransactionOrchestrator::execute).
///
/// The `Display` output of every variant is the final user-facing message.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    /// No valid signer session.
    #[error("Please sign in to continue")]
    Unauthenticated,
    /// A field required by the operation is missing or blank.
    #[error("Missing required parameter `{field}` for {operation}")]
    MissingParameter {
        /// The operation being executed.
        operation: Operation,
        /// Name of the missing field.
        field: &'static str,
    },
    /// A field is present but unusable.
    #[error("Invalid parameter `{field}`: {reason}")]
    InvalidParameter {
        /// Name of the field.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },
    /// The native gas balance is below the configured minimum.
    #[error("Insufficient {symbol} for gas fees: balance {balance}, need at least {required}")]
    InsufficientGas {
        /// Symbol of the native asset.
        symbol: String,
        /// Balance read from the chain.
        balance: Decimal,
        /// Configured minimum.
        required: Decimal,
    },
    /// The position token balance does not cover the operation.
    #[error(transparent)]
    InsufficientFunds(ActionableError),
    /// Building or submitting the approval transaction failed.
    #[error("Token approval transaction failed: {0}")]
    ApprovalFailed(Box<PipelineError>),
    /// The signing service could not estimate gas for the transaction.
    #[error("Insufficient gas for fees")]
    GasEstimationFailure,
    /// A failure that mentions the allowance or approval.
    #[error("Token approval failed: {0}")]
    ApprovalFailure(String),
    /// The request never reached its destination.
    #[error("Network error, please check your connection and try again: {0}")]
    NetworkError(String),
    /// The transaction reverted on chain.
    #[error("Transaction reverted: {0}")]
    ChainRevert(String),
    /// A message that is already user-facing and is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),
    /// The transaction lock vetoed the attempt.
    #[error("A matching transaction is already in progress: {0}")]
    TransactionLocked(String),
    /// Nothing more specific is known.
    #[error("Transaction failed, please try again")]
    UnknownFailure,
}

impl PipelineError {
    /// Returns the [`ErrorKind`] of the error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthenticated => ErrorKind::Unauthenticated,
            Self::MissingParameter { .. } => ErrorKind::MissingParameter,
            Self::InvalidParameter { .. } => ErrorKind::InvalidParameter,
            Self::InsufficientGas { .. } => ErrorKind::InsufficientGas,
            Self::InsufficientFunds(_) => ErrorKind::InsufficientFunds,
            Self::ApprovalFailed(_) => ErrorKind::ApprovalFailed,
            Self::GasEstimationFailure => ErrorKind::GasEstimationFailure,
            Self::ApprovalFailure(_) => ErrorKind::ApprovalFailure,
            Self::NetworkError(_) => ErrorKind::NetworkError,
            Self::ChainRevert(_) => ErrorKind::ChainRevert,
            Self::Rejected(_) => ErrorKind::Rejected,
            Self::TransactionLocked(_) => ErrorKind::TransactionLocked,
            Self::UnknownFailure => ErrorKind::UnknownFailure,
        }
    }

    /// Returns the remedial action attached to the error, if any.
    ///
    /// Actions survive wrapping, an approval failure caused by an actionable error still
    /// reports the action.
    pub fn action(&self) -> Option<&ErrorAction> {
        match self {
            Self::InsufficientFunds(err) => err.action.as_ref(),
            Self::ApprovalFailed(inner) => inner.action(),
            _ => None,
        }
    }

    /// Whether the error carries a remedial action.
    pub fn is_actionable(&self) -> bool {
        self.action().is_some()
    }

    /// Returns the kind and user-facing message of the error.
    pub fn classification(&self) -> Classification {
        Classification { kind: self.kind(), user_message: self.to_string() }
    }
}

/// The closed set of failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    /// See [`PipelineError::Unauthenticated`].
    Unauthenticated,
    /// See [`PipelineError::MissingParameter`].
    MissingParameter,
    /// See [`PipelineError::InvalidParameter`].
    InvalidParameter,
    /// See [`PipelineError::InsufficientGas`].
    InsufficientGas,
    /// See [`PipelineError::InsufficientFunds`].
    InsufficientFunds,
    /// See [`PipelineError::ApprovalFailed`].
    ApprovalFailed,
    /// See [`PipelineError::GasEstimationFailure`].
    GasEstimationFailure,
    /// See [`PipelineError::ApprovalFailure`].
    ApprovalFailure,
    /// See [`PipelineError::NetworkError`].
    NetworkError,
    /// See [`PipelineError::ChainRevert`].
    ChainRevert,
    /// See [`PipelineError::Rejected`].
    Rejected,
    /// See [`PipelineError::TransactionLocked`].
    TransactionLocked,
    /// See [`PipelineError::UnknownFailure`].
    UnknownFailure,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Kind and user-facing message of a [`PipelineError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Classification {
    /// The kind of failure.
    pub kind: ErrorKind,
    /// Message suitable for showing to the user.
    pub user_message: String,
}
