use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error that suggests how the user can resolve it.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{message}")]
pub struct ActionableError {
    /// User-facing message.
    pub message: String,
    /// Suggested remedial action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<ErrorAction>,
}

impl ActionableError {
    /// Creates an error without an action.
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into(), action: None }
    }

    /// Creates an error that points the user at `target`.
    pub fn navigate(
        message: impl Into<String>,
        target: impl Into<String>,
        label: impl Into<String>,
    ) -> Self {
        Self {
            message: message.into(),
            action: Some(ErrorAction::Navigate { target: target.into(), label: label.into() }),
        }
    }
}

/// A remedial action attached to an [`ActionableError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ErrorAction {
    /// Send the user to another screen.
    Navigate {
        /// Route to navigate to.
        target: String,
        /// Label of the call to action.
        label: String,
    },
}
