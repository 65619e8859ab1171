//! Error types for resource requests

use bridge_traits::error::BridgeError;
use core_auth::AuthError;
use thiserror::Error;

/// Failures returned by [`RetryingRequestExecutor`](crate::RetryingRequestExecutor)
/// and the [`ResourceClient`](crate::ResourceClient) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Transport failure; the service was not reached.
    #[error("Network problem: {0}")]
    NetworkProblem(String),

    /// Non-2xx status with no more specific meaning.
    #[error("Unexpected response (status: {status:?})")]
    Unknown { status: Option<u16> },

    /// The resource does not exist. Some operations turn this into an empty
    /// result instead.
    #[error("Resource not found")]
    NotFound,

    /// Authentication kept failing after re-authentication, or the sign-in
    /// itself was rejected.
    #[error("Not authenticated")]
    NotAuthenticated,

    /// The user dismissed the sign-in surface.
    #[error("Cancelled by user")]
    UserCancelled,

    /// 2xx response whose body could not be decoded.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The request could not be built.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<AuthError> for NetworkError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UserCancelled => NetworkError::UserCancelled,
            AuthError::NetworkProblem(msg) => NetworkError::NetworkProblem(msg),
            AuthError::Unknown { status } => NetworkError::Unknown { status },
            AuthError::InvalidResponse(msg) => NetworkError::InvalidResponse(msg),
            AuthError::InvalidCredentials | AuthError::EmailTaken => {
                NetworkError::NotAuthenticated
            }
            AuthError::Internal(msg) => NetworkError::Internal(msg),
        }
    }
}

impl From<BridgeError> for NetworkError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::Connection(msg) | BridgeError::Timeout(msg) => {
                NetworkError::NetworkProblem(msg)
            }
            other => NetworkError::NetworkProblem(other.to_string()),
        }
    }
}

/// Result type for resource operations
pub type Result<T> = std::result::Result<T, NetworkError>;
