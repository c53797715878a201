//! Error types shared by the request bridge and the portal interfaces.

use std::time::Duration;

use thiserror::Error;
use zbus::fdo;

/// Failures a bridged portal request can end in.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BridgeError {
    /// The correlation token was empty.
    #[error("request token must not be empty")]
    InvalidToken,

    /// Another request with the same token is still in flight.
    #[error("a request with token {0} is already in flight")]
    DuplicateToken(String),

    /// The UI process could not be reached; nothing is shown to the user.
    #[error("failed to dispatch request to the UI process: {0}")]
    DispatchFailed(String),

    /// The dialog was dispatched but the request ended without an answer.
    #[error("request failed: {0}")]
    Failed(String),

    /// No completion arrived within the wait budget.
    #[error("no response from the UI process within {0:?}")]
    Timeout(Duration),

    /// The frontend closed the request before it completed.
    #[error("request was closed by the caller")]
    Cancelled,
}

impl From<BridgeError> for fdo::Error {
    fn from(err: BridgeError) -> Self {
        match err {
            BridgeError::InvalidToken | BridgeError::DuplicateToken(_) => {
                fdo::Error::InvalidArgs(err.to_string())
            }
            BridgeError::Timeout(_) => fdo::Error::TimedOut(err.to_string()),
            BridgeError::DispatchFailed(_) | BridgeError::Failed(_) | BridgeError::Cancelled => {
                fdo::Error::Failed(err.to_string())
            }
        }
    }
}
