use std::{borrow::Cow, fmt};
use thiserror::Error;

/// The remote system a [`GatewayError`] originated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Boundary {
    /// The custodial signing service.
    Signer,
    /// The transaction backend.
    Backend,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Signer => f.write_str("signer"),
            Self::Backend => f.write_str("backend"),
        }
    }
}

/// A failure reported by one of the remote collaborators, before classification.
///
/// The shapes mirror what the boundaries actually produce, they are not normalized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// The remote answered with a non-success status.
    #[error("{boundary} responded with status {status}: {message}")]
    Http {
        /// Where the response came from.
        boundary: Boundary,
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },
    /// An error carrying a message.
    #[error("{0}")]
    Message(String),
    /// A bare rejection value that is not an error object.
    #[error("{0}")]
    Rejected(String),
    /// The request could not be delivered.
    #[error("network request failed: {0}")]
    Transport(String),
    /// A failure without any detail.
    #[error("unknown failure")]
    Unknown,
}

impl GatewayError {
    /// Creates an HTTP error from `boundary`.
    pub fn http(boundary: Boundary, status: u16, message: impl Into<String>) -> Self {
        Self::Http { boundary, status, message: message.into() }
    }

    /// Maps a [`reqwest::Error`] raised while talking to `boundary`.
    pub fn from_reqwest(boundary: Boundary, err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => Self::http(boundary, status.as_u16(), err.to_string()),
            None if err.is_decode() => Self::Message(format!("invalid {boundary} response: {err}")),
            None => Self::Transport(err.to_string()),
        }
    }

    /// Maps an alloy RPC error.
    pub fn from_rpc(err: alloy::transports::TransportError) -> Self {
        match err {
            alloy::transports::RpcError::ErrorResp(payload) => Self::Message(payload.message.into()),
            alloy::transports::RpcError::Transport(kind) => Self::Transport(kind.to_string()),
            err => Self::Message(err.to_string()),
        }
    }

    /// Text the classifier matches against, if the failure has any.
    pub fn text(&self) -> Option<Cow<'_, str>> {
        match self {
            Self::Http { message, .. } | Self::Message(message) | Self::Rejected(message) => {
                Some(Cow::Borrowed(message))
            }
            Self::Transport(_) => Some(Cow::Owned(self.to_string())),
            Self::Unknown => None,
        }
    }

    /// Whether the failure is an error object, as opposed to a bare rejection.
    pub const fn is_error_object(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Message(_) | Self::Transport(_))
    }
}
