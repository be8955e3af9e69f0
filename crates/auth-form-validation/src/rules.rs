//! Validation rules for each auth form.
//!
//! Rules run in full on every call; the returned [`ValidationErrors`] map
//! is the only output. Messages are the exact strings the presentation
//! layer renders under each input.

use crate::field::{Field, ValidationErrors};
use crate::forms::{LoginForm, LoginMethod, OtpForm, SignupForm, SignupMethod};
use crate::policy::ValidationPolicy;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Permissive `local@domain` shape: non-blank local part, non-blank
    /// domain with at least one dot-separated segment.
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    /// Permissive phone shape: optional leading `+`, then digits, spaces,
    /// hyphens, and parentheses.
    static ref PHONE_RE: Regex = Regex::new(r"^\+?[\d\s()\-]+$").unwrap();
}

/// Returns true if the string looks like an email address.
pub fn email_is_valid(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Returns true if the string looks like a phone number.
pub fn phone_is_valid(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

fn check_email(errors: &mut ValidationErrors, email: &str) {
    if email.is_empty() {
        errors.flag(Field::Email, "Email is required");
    } else if !email_is_valid(email) {
        errors.flag(Field::Email, "Email is invalid");
    }
}

fn check_password(errors: &mut ValidationErrors, password: &str, policy: &ValidationPolicy) {
    if password.is_empty() {
        errors.flag(Field::Password, "Password is required");
    } else if password.chars().count() < policy.min_password_len {
        errors.flag(
            Field::Password,
            format!(
                "Password must be at least {} characters",
                policy.min_password_len
            ),
        );
    }
}

fn check_phone(errors: &mut ValidationErrors, phone: &str) {
    if phone.is_empty() {
        errors.flag(Field::Phone, "Phone number is required");
    } else if !phone_is_valid(phone) {
        errors.flag(Field::Phone, "Phone number is invalid");
    }
}

fn check_otp(errors: &mut ValidationErrors, otp: &str, policy: &ValidationPolicy) {
    if otp.is_empty() {
        errors.flag(Field::Otp, "OTP is required");
    } else if otp.chars().count() != policy.otp_len {
        errors.flag(Field::Otp, format!("OTP must be {} digits", policy.otp_len));
    } else if !otp.chars().all(|c| c.is_ascii_digit()) {
        errors.flag(Field::Otp, "OTP must contain only numbers");
    }
}

/// Validates the login form for the selected method.
pub fn validate_login(
    form: &LoginForm,
    method: LoginMethod,
    policy: &ValidationPolicy,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    match method {
        LoginMethod::Email => {
            check_email(&mut errors, &form.email);
            check_password(&mut errors, &form.password, policy);
        }
        LoginMethod::Otp => {
            check_phone(&mut errors, &form.phone);
            check_otp(&mut errors, &form.otp, policy);
        }
    }

    errors
}

/// Validates the signup form for the selected method.
///
/// First and last name are required regardless of method; the confirm
/// password check runs whenever the passwords differ, independent of the
/// password field's own validity.
pub fn validate_signup(
    form: &SignupForm,
    method: SignupMethod,
    policy: &ValidationPolicy,
) -> ValidationErrors {
    let mut errors = ValidationErrors::new();

    if form.first_name.trim().is_empty() {
        errors.flag(Field::FirstName, "First name is required");
    }
    if form.last_name.trim().is_empty() {
        errors.flag(Field::LastName, "Last name is required");
    }

    match method {
        SignupMethod::Email => {
            check_email(&mut errors, &form.email);
            check_password(&mut errors, &form.password, policy);
            if form.password != form.confirm_password {
                errors.flag(Field::ConfirmPassword, "Passwords do not match");
            }
        }
        SignupMethod::Phone => {
            check_phone(&mut errors, &form.phone);
        }
    }

    errors
}

/// Validates the standalone OTP verification form.
pub fn validate_otp(form: &OtpForm, policy: &ValidationPolicy) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    check_otp(&mut errors, &form.otp, policy);
    errors
}
