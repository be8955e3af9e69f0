//! Session state for the authentication flow.
//!
//! The store is a cloneable handle over a single mutex-guarded
//! [`AuthSession`]. Mutations are synchronous and total: callers always
//! observe a complete, consistent session. Only [`AuthFlow`] actions write
//! to it during the flow's lifetime.
//!
//! [`AuthFlow`]: crate::AuthFlow

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// An authenticated user, as reported by the authentication service.
///
/// Replaced wholesale on re-authentication; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// UI-facing session state: one instance per flow session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    /// True only strictly between an action's invocation and its
    /// settlement.
    pub is_loading: bool,
    /// Human-readable message from the most recent failed attempt.
    pub error: Option<String>,
    /// The authenticated user, once an attempt succeeds.
    pub user: Option<User>,
}

/// Cloneable handle to the session state.
#[derive(Clone, Default)]
pub struct AuthSessionStore {
    inner: Arc<Mutex<AuthSession>>,
}

impl AuthSessionStore {
    /// Creates a store holding a fresh, idle session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the current session state.
    pub fn session(&self) -> AuthSession {
        self.inner.lock().unwrap().clone()
    }

    /// Returns true while an attempt is in flight.
    pub fn is_loading(&self) -> bool {
        self.inner.lock().unwrap().is_loading
    }

    /// Returns the current error message, if any.
    pub fn error(&self) -> Option<String> {
        self.inner.lock().unwrap().error.clone()
    }

    /// Returns the authenticated user, if any.
    pub fn user(&self) -> Option<User> {
        self.inner.lock().unwrap().user.clone()
    }

    /// Sets the loading flag.
    pub fn set_loading(&self, loading: bool) {
        self.inner.lock().unwrap().is_loading = loading;
    }

    /// Sets or clears the error message.
    pub fn set_error(&self, error: Option<String>) {
        self.inner.lock().unwrap().error = error;
    }

    /// Sets or clears the authenticated user.
    pub fn set_user(&self, user: Option<User>) {
        self.inner.lock().unwrap().user = user;
    }

    /// Clears user and error together. The loading flag is untouched:
    /// logout is not a backend call.
    pub fn logout(&self) {
        let mut session = self.inner.lock().unwrap();
        session.user = None;
        session.error = None;
    }

    /// Starts an attempt: atomically checks the single-flight guard, sets
    /// the loading flag, and clears any prior error.
    ///
    /// Returns false (leaving the session untouched) if another attempt is
    /// already in flight.
    pub(crate) fn begin_attempt(&self) -> bool {
        let mut session = self.inner.lock().unwrap();
        if session.is_loading {
            return false;
        }
        session.is_loading = true;
        session.error = None;
        true
    }

    /// Settles a successful attempt: resets loading and installs the user
    /// if the response carried one.
    pub(crate) fn settle_success(&self, user: Option<User>) {
        let mut session = self.inner.lock().unwrap();
        session.is_loading = false;
        session.error = None;
        if let Some(user) = user {
            session.user = Some(user);
        }
    }

    /// Settles a failed attempt: resets loading and records the message.
    /// The user field keeps its previous value.
    pub(crate) fn settle_failure(&self, message: String) {
        let mut session = self.inner.lock().unwrap();
        session.is_loading = false;
        session.error = Some(message);
    }
}
