//! Form data types filled in by the presentation layer.
//!
//! Every field is a plain `String` mirroring the text inputs; which fields
//! matter for a given submission is decided by the selected method.

use serde::{Deserialize, Serialize};

/// How the user chose to log in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginMethod {
    /// Email address and password.
    Email,
    /// Phone number and a one-time password.
    Otp,
}

/// How the user chose to sign up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignupMethod {
    /// Email address and password.
    Email,
    /// Phone number, verified by OTP in a follow-up step.
    Phone,
}

/// Login form state. Only the fields of the active [`LoginMethod`] are
/// validated and submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub phone: String,
    pub otp: String,
}

/// Signup form state. First and last name are always required; the
/// remaining fields depend on the active [`SignupMethod`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub password: String,
    pub confirm_password: String,
}

/// OTP verification form state. The phone is carried over from the signup
/// step; only the code itself is user input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpForm {
    pub phone: String,
    pub otp: String,
}
