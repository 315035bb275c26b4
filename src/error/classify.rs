//! Mapping of raw collaborator failures onto [`PipelineError`].
//!
//! Rules are evaluated in table order and the first match wins. Messages routinely match several
//! rules (a reverted approval mentions both the allowance and the revert), so the order is part of
//! the contract.

use super::{Boundary, GatewayError, PipelineError};

/// Anything the pipeline can fail with before classification.
#[derive(Debug, Clone)]
pub enum Failure {
    /// Already classified, passes through unchanged.
    Typed(PipelineError),
    /// Raw failure of a collaborator.
    Raw(GatewayError),
}

impl From<PipelineError> for Failure {
    fn from(err: PipelineError) -> Self {
        Self::Typed(err)
    }
}

impl From<GatewayError> for Failure {
    fn from(err: GatewayError) -> Self {
        Self::Raw(err)
    }
}

type Rule = fn(&GatewayError) -> Option<PipelineError>;

/// Classification rules for raw failures, in evaluation order.
///
/// Typed failures, actionable ones included, never reach this table.
const RULES: &[(&str, Rule)] = &[
    ("signer-internal-error", signer_internal_error),
    ("insufficient-asset", insufficient_asset),
    ("approval", approval),
    ("network", network),
    ("revert", revert),
    ("message", message),
];

/// Classifies a failure into the final [`PipelineError`].
pub fn classify(failure: impl Into<Failure>) -> PipelineError {
    match failure.into() {
        Failure::Typed(err) => err,
        Failure::Raw(err) => RULES
            .iter()
            .find_map(|(_, rule)| rule(&err))
            .unwrap_or(PipelineError::UnknownFailure),
    }
}

/// Returns the name of the first rule matching `err`.
pub fn matching_rule(err: &GatewayError) -> Option<&'static str> {
    RULES.iter().find(|(_, rule)| rule(err).is_some()).map(|(name, _)| *name)
}

fn signer_internal_error(err: &GatewayError) -> Option<PipelineError> {
    matches!(err, GatewayError::Http { boundary: Boundary::Signer, status: 500, .. })
        .then_some(PipelineError::GasEstimationFailure)
}

/// `Insufficient ETH`, `Insufficient RETH` and friends are already user-facing.
fn insufficient_asset(err: &GatewayError) -> Option<PipelineError> {
    const PREFIX: &str = "Insufficient ";

    let text = err.text()?;
    let names_asset = text.match_indices(PREFIX).any(|(idx, _)| {
        text[idx + PREFIX.len()..].chars().next().is_some_and(|c| c.is_ascii_uppercase())
    });
    names_asset.then(|| PipelineError::Rejected(text.into_owned()))
}

fn approval(err: &GatewayError) -> Option<PipelineError> {
    let text = err.text()?;
    contains_any(&text, &["allowance", "approval"])
        .then(|| PipelineError::ApprovalFailure(text.into_owned()))
}

fn network(err: &GatewayError) -> Option<PipelineError> {
    let text = err.text()?;
    contains_any(&text, &["network", "fetch"])
        .then(|| PipelineError::NetworkError(text.into_owned()))
}

fn revert(err: &GatewayError) -> Option<PipelineError> {
    let text = err.text()?;
    contains_any(&text, &["reverted", "execution reverted"])
        .then(|| PipelineError::ChainRevert(text.into_owned()))
}

/// Error objects with a message surface it as is. Bare rejections and empty messages do not.
fn message(err: &GatewayError) -> Option<PipelineError> {
    if !err.is_error_object() {
        return None;
    }
    let text = err.text()?;
    (!text.trim().is_empty()).then(|| PipelineError::Rejected(text.into_owned()))
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    let text = text.to_lowercase();
    needles.iter().any(|needle| text.contains(needle))
}
