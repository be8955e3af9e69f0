//! Contract between the flow and the authentication backend.
//!
//! The backend is an injected collaborator: the flow never performs
//! transport itself. Implementations must resolve every call exactly once,
//! either with an [`AuthResponse`] (business outcome, success or rejection)
//! or a [`ServiceError`] (transport fault).

use crate::error::ServiceError;
use crate::session::User;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// Login credentials. Exactly one shape is active per submission,
/// selected by the login method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum Credentials {
    /// Email address and password.
    Email { email: String, password: String },
    /// Phone number and a one-time password.
    Otp { phone: String, otp: String },
}

/// Contact shape of a signup request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SignupContact {
    /// Email address and chosen password. The confirm-password field is a
    /// local validation concern and never crosses this boundary.
    Email { email: String, password: String },
    /// Phone number, to be verified by OTP.
    Phone { phone: String },
}

/// A signup request submitted to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub contact: SignupContact,
}

/// A pending phone verification: the phone an OTP was sent to, plus the
/// code the user entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpChallenge {
    pub phone: String,
    pub otp: String,
}

/// Business outcome of an authentication call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Whether the attempt was accepted.
    pub success: bool,
    /// Human-readable outcome message; rendered as the session error on
    /// rejection.
    pub message: String,
    /// The authenticated user, present on accepted login/signup/verify.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    /// Opaque session token, if the backend issues one. Persistence is the
    /// embedding application's concern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl AuthResponse {
    /// An accepted response carrying a user.
    pub fn accepted(message: impl Into<String>, user: User) -> Self {
        Self {
            success: true,
            message: message.into(),
            user: Some(user),
            token: None,
        }
    }

    /// An accepted response with no user payload (e.g. an OTP send).
    pub fn acknowledged(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            user: None,
            token: None,
        }
    }

    /// A business rejection.
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            user: None,
            token: None,
        }
    }
}

/// The authentication backend the flow delegates to.
///
/// All methods are asynchronous and must resolve exactly once. The flow
/// holds no lock across these calls and guarantees at most one call is in
/// flight per session.
pub trait AuthenticationService {
    /// Authenticates with either credential shape.
    fn login(
        &self,
        credentials: Credentials,
    ) -> impl Future<Output = Result<AuthResponse, ServiceError>> + Send;

    /// Creates an account from a signup request.
    fn signup(
        &self,
        request: SignupRequest,
    ) -> impl Future<Output = Result<AuthResponse, ServiceError>> + Send;

    /// Sends (or re-sends) an OTP to the given phone.
    fn request_otp(
        &self,
        phone: &str,
    ) -> impl Future<Output = Result<AuthResponse, ServiceError>> + Send;

    /// Verifies a pending phone with the code the user entered.
    fn verify_otp(
        &self,
        challenge: OtpChallenge,
    ) -> impl Future<Output = Result<AuthResponse, ServiceError>> + Send;

    /// Alternate credential source; bypasses local validation entirely.
    fn google_login(&self) -> impl Future<Output = Result<AuthResponse, ServiceError>> + Send;
}
