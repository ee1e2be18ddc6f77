//! Client error taxonomy.

use gangbook_domain::DomainError;
use gangbook_shared::{ErrorKind, MutationFailure};

#[derive(Debug, Clone, thiserror::Error)]
pub enum ClientError {
    /// The request never got a response (connect, timeout, reset)
    #[error("Transport error: {0}")]
    Transport(String),
    /// The server answered outside the envelope
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// The response body could not be decoded
    #[error("Invalid response: {0}")]
    Decode(String),
    /// The server processed the request and said no
    #[error("{0}")]
    Rejected(#[from] MutationFailure),
    /// The speculative patch could not be computed from the cached state
    #[error("{0}")]
    Local(#[from] DomainError),
}

impl ClientError {
    /// Network-level failures worth another attempt. Domain answers never are.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) => true,
            Self::Http { status, .. } => *status >= 500 || *status == 429,
            Self::Decode(_) | Self::Rejected(_) | Self::Local(_) => false,
        }
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Rejected(failure) => Some(failure.kind),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Decode(e.to_string())
        } else {
            Self::Transport(e.to_string())
        }
    }
}
