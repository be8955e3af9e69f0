//! Error types for the authentication flow.

use thiserror::Error;

/// Flow-level error type.
///
/// Service failures never surface here; they settle into the session's
/// error string. These variants indicate a mis-sequenced event from the
/// embedding layer.
#[derive(Error, Debug)]
pub enum AuthFlowError {
    /// An event arrived that is not legal in the current mode.
    #[error("Invalid flow transition: {0}")]
    InvalidTransition(String),

    /// An OTP action was attempted with no pending phone captured.
    #[error("No pending phone for OTP verification")]
    MissingPendingPhone,
}

/// Result type alias using AuthFlowError.
pub type AuthFlowResult<T> = Result<T, AuthFlowError>;

/// Transport-level failure raised by an [`AuthenticationService`] call.
///
/// Business rejections (wrong password, unknown OTP) are not errors; they
/// arrive as an [`AuthResponse`] with `success = false`.
///
/// [`AuthenticationService`]: crate::AuthenticationService
/// [`AuthResponse`]: crate::AuthResponse
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Network unavailable (transient, can retry)
    #[error("Network unavailable")]
    NetworkUnavailable,

    /// The call did not resolve in time
    #[error("Operation timed out")]
    Timeout,

    /// The service raised a fault with its own message
    #[error("{0}")]
    Rejected(String),
}

impl ServiceError {
    /// Returns true if this error is transient and the attempt can be
    /// retried as-is.
    pub fn is_transient(&self) -> bool {
        matches!(self, ServiceError::NetworkUnavailable | ServiceError::Timeout)
    }
}
