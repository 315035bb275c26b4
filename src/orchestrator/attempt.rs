use crate::{
    error::PipelineError,
    types::{Operation, OperationParams},
};
use alloy::primitives::B256;
use std::fmt;
use tracing::debug;

/// Phases of a pipeline attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Nothing has happened yet.
    Idle,
    /// Checking the session and parameters.
    ValidatingAuth,
    /// Asking the signer for the account address.
    ResolvingAddress,
    /// Reading balances.
    PreflightChecking,
    /// Reading the allowance.
    AllowanceChecking,
    /// Building and submitting the approval.
    ApprovalPending,
    /// Building the main transaction.
    BuildingMainTransaction,
    /// Submitting the main transaction.
    Submitting,
    /// The main transaction was broadcast.
    Confirmed,
    /// The attempt failed.
    Failed,
}

impl Phase {
    /// Whether the phase ends the attempt.
    pub const fn is_final(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Failed)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// State of one invocation of the pipeline.
///
/// Created at the start of an invocation and owned by it, never shared.
#[derive(Debug, Clone)]
pub struct PipelineAttempt {
    /// Parameters of the attempt.
    params: OperationParams,
    /// Current phase.
    phase: Phase,
    /// Every phase entered, in order.
    history: Vec<Phase>,
    /// Hash of the main transaction, once confirmed.
    tx_hash: Option<B256>,
    /// Final error, once failed.
    error: Option<PipelineError>,
}

impl PipelineAttempt {
    /// Creates a new attempt in [`Phase::Idle`].
    pub fn new(params: OperationParams) -> Self {
        Self { params, phase: Phase::Idle, history: vec![Phase::Idle], tx_hash: None, error: None }
    }

    /// Returns the operation.
    pub const fn operation(&self) -> Operation {
        self.params.operation()
    }

    /// Returns the parameters.
    pub const fn params(&self) -> &OperationParams {
        &self.params
    }

    /// Returns the current phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns every phase entered so far.
    pub fn history(&self) -> &[Phase] {
        &self.history
    }

    /// Whether the attempt entered `phase` at some point.
    pub fn visited(&self, phase: Phase) -> bool {
        self.history.contains(&phase)
    }

    /// Returns the error of a failed attempt.
    pub const fn error(&self) -> Option<&PipelineError> {
        self.error.as_ref()
    }

    /// Returns the transaction hash of a confirmed attempt.
    pub const fn tx_hash(&self) -> Option<B256> {
        self.tx_hash
    }

    pub(crate) fn advance(&mut self, next: Phase) {
        debug!(
            operation = %self.operation(),
            from = %self.phase,
            to = %next,
            "Pipeline transition"
        );
        self.phase = next;
        self.history.push(next);
    }

    pub(crate) fn confirm(&mut self, tx_hash: B256) {
        self.advance(Phase::Confirmed);
        self.tx_hash = Some(tx_hash);
    }

    pub(crate) fn fail(&mut self, error: PipelineError) {
        self.advance(Phase::Failed);
        self.error = Some(error);
    }

    /// Converts a finished attempt into its result.
    pub fn into_result(self) -> Result<B256, PipelineError> {
        match (self.tx_hash, self.error) {
            (_, Some(error)) => Err(error),
            (Some(tx_hash), None) => Ok(tx_hash),
            (None, None) => Err(PipelineError::UnknownFailure),
        }
    }
}
