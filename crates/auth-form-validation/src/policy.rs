//! Validation policy knobs.

/// Length requirements applied by the validation rules.
#[derive(Debug, Clone)]
pub struct ValidationPolicy {
    /// Minimum password length for email-based login and signup.
    pub min_password_len: usize,
    /// Exact length of a one-time password.
    pub otp_len: usize,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            otp_len: 6,
        }
    }
}
