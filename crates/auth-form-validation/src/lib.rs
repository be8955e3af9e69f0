//! Form validation for the authentication flow.
//!
//! This crate provides:
//! - Form data types for the login, signup, and OTP verification forms
//! - Pure, deterministic field validation returning per-field error maps
//! - A validation policy (password/OTP length requirements) with defaults
//!
//! Validation is synchronous and side-effect free. Each submission re-runs
//! the full rule set for its form; nothing is cached between runs, so
//! identical input always yields an identical error map.

mod field;
mod forms;
mod policy;
mod rules;

pub use field::{Field, ValidationErrors};
pub use forms::{LoginForm, LoginMethod, OtpForm, SignupForm, SignupMethod};
pub use policy::ValidationPolicy;
pub use rules::{email_is_valid, phone_is_valid, validate_login, validate_otp, validate_signup};
