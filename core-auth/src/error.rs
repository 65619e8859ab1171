use thiserror::Error;

/// Failures delivered to token requesters and returned from the sign-in and
/// registration entry points.
///
/// `Clone` because one failure is fanned out to every waiting requester.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The auth service did not recognize the email/password pair.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// The auth service could not be reached.
    #[error("Network problem: {0}")]
    NetworkProblem(String),

    /// The auth service answered with an unexpected status.
    #[error("Unknown authentication failure (status: {status:?})")]
    Unknown { status: Option<u16> },

    /// Registration used an email that already has an account.
    #[error("Email address is already registered")]
    EmailTaken,

    /// The user dismissed the sign-in surface.
    #[error("Sign-in cancelled by user")]
    UserCancelled,

    /// The auth service answered 2xx with a body that is not a user.
    #[error("Invalid response from auth service: {0}")]
    InvalidResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Whether the user can reasonably try the same action again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuthError::NetworkProblem(_) | AuthError::Unknown { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable() {
        assert!(AuthError::NetworkProblem("offline".to_string()).is_retryable());
        assert!(AuthError::Unknown { status: Some(500) }.is_retryable());

        assert!(!AuthError::InvalidCredentials.is_retryable());
        assert!(!AuthError::EmailTaken.is_retryable());
        assert!(!AuthError::UserCancelled.is_retryable());
        assert!(!AuthError::InvalidResponse("bad".to_string()).is_retryable());
    }
}
