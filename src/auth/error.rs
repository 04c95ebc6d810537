use thiserror::Error;

use crate::error::DeskError;

/// Errors raised while acquiring a token.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The source cannot be used here; a chain should try the next one.
    #[error("{credential} unavailable: {reason}")]
    Unavailable {
        credential: &'static str,
        reason: String,
    },
    /// The source was usable but rejected the request.
    #[error("{credential} authentication failed: {message}")]
    Failed {
        credential: &'static str,
        message: String,
    },
    #[error("no credential in the chain provided a token:\n{0}")]
    ChainExhausted(String),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AuthError {
    pub fn unavailable(credential: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            credential,
            reason: reason.into(),
        }
    }

    pub fn failed(credential: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            credential,
            message: message.into(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(error: reqwest::Error) -> Self {
        Self::Network(error.to_string())
    }
}

impl From<std::io::Error> for AuthError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}

impl From<serde_json::Error> for AuthError {
    fn from(error: serde_json::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

impl From<AuthError> for DeskError {
    fn from(error: AuthError) -> Self {
        DeskError::Authentication(error.to_string())
    }
}
