//! The authentication flow orchestrator.
//!
//! `AuthFlow` drives the mode machine, runs local validation, delegates to
//! the injected [`AuthenticationService`], and settles outcomes into the
//! [`AuthSessionStore`]. The presentation layer feeds events in and renders
//! the [`FlowSnapshot`] it reads back (or receives via the optional
//! snapshot callback).
//!
//! Concurrency model: actions run on a cooperative event loop and suspend
//! only across the service call. `begin_attempt` on the store is the
//! single-flight guard, so a second submission while one is in flight is a
//! silent no-op. Each attempt reads a generation ticket after its last mode
//! transition; `back_to_signup` and `logout` bump the generation, and a
//! settlement whose ticket no longer matches is discarded without touching
//! any state.

use crate::error::{AuthFlowError, AuthFlowResult, ServiceError};
use crate::flow_fsm::{FlowMachine, FlowMachineInput, FlowMode};
use crate::service::{
    AuthResponse, AuthenticationService, Credentials, OtpChallenge, SignupContact, SignupRequest,
};
use crate::session::{AuthSessionStore, User};
use auth_form_validation::{
    validate_login, validate_otp, validate_signup, Field, LoginForm, LoginMethod, OtpForm,
    SignupForm, SignupMethod, ValidationErrors, ValidationPolicy,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Everything the presentation layer needs to render the flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    /// The current mode (which view to render).
    pub mode: FlowMode,
    /// True while an attempt is in flight; submission controls must be
    /// disabled.
    pub is_loading: bool,
    /// Message from the most recent failed attempt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Per-field validation errors from the most recent submission.
    pub validation_errors: ValidationErrors,
    /// The phone awaiting OTP verification, shown in the OTP view.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_phone: Option<String>,
    /// The authenticated user; a set user is the flow's terminal signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Callback type for push-style snapshot notifications.
pub type SnapshotCallback = Box<dyn Fn(FlowSnapshot) + Send + Sync>;

/// Outcome of settling a service call against the session store.
enum Settled {
    /// The attempt was abandoned before the response arrived.
    Stale,
    /// The response was applied as a failure.
    Failure,
    /// The response was applied as a success.
    Success,
}

/// The authentication flow state machine.
///
/// One instance per flow session; the session store is created by the
/// caller and passed in, so its lifecycle is explicit.
pub struct AuthFlow<S> {
    service: S,
    store: AuthSessionStore,
    policy: ValidationPolicy,
    fsm: Mutex<FlowMachine>,
    pending_phone: Mutex<Option<String>>,
    validation_errors: Mutex<ValidationErrors>,
    /// Bumped whenever in-flight attempts become stale.
    attempt_gen: AtomicU64,
    snapshot_callback: Mutex<Option<SnapshotCallback>>,
}

impl<S: AuthenticationService> AuthFlow<S> {
    /// Creates a flow in the initial Login mode with the default
    /// validation policy.
    pub fn new(service: S, store: AuthSessionStore) -> Self {
        Self::with_policy(service, store, ValidationPolicy::default())
    }

    /// Creates a flow with a custom validation policy.
    pub fn with_policy(service: S, store: AuthSessionStore, policy: ValidationPolicy) -> Self {
        Self {
            service,
            store,
            policy,
            fsm: Mutex::new(FlowMachine::new()),
            pending_phone: Mutex::new(None),
            validation_errors: Mutex::new(ValidationErrors::new()),
            attempt_gen: AtomicU64::new(0),
            snapshot_callback: Mutex::new(None),
        }
    }

    /// Registers a callback invoked after every observable change.
    pub fn set_snapshot_callback(&self, callback: SnapshotCallback) {
        let mut cb = self.snapshot_callback.lock().unwrap();
        *cb = Some(callback);
    }

    /// The current mode.
    pub fn mode(&self) -> FlowMode {
        FlowMode::from(self.fsm.lock().unwrap().state())
    }

    /// The session store backing this flow.
    pub fn store(&self) -> &AuthSessionStore {
        &self.store
    }

    /// The phone awaiting OTP verification, if any.
    pub fn pending_phone(&self) -> Option<String> {
        self.pending_phone.lock().unwrap().clone()
    }

    /// Per-field errors from the most recent submission.
    pub fn validation_errors(&self) -> ValidationErrors {
        self.validation_errors.lock().unwrap().clone()
    }

    /// True once an attempt has authenticated a user.
    pub fn is_authenticated(&self) -> bool {
        self.store.user().is_some()
    }

    /// A full snapshot for rendering.
    pub fn snapshot(&self) -> FlowSnapshot {
        let session = self.store.session();
        FlowSnapshot {
            mode: self.mode(),
            is_loading: session.is_loading,
            error: session.error,
            validation_errors: self.validation_errors(),
            pending_phone: self.pending_phone(),
            user: session.user,
        }
    }

    /// Submits the login form. Validation failures and the single-flight
    /// guard resolve to `Ok` with no service call; only a mis-sequenced
    /// event (submit outside Login mode) is an error.
    pub async fn submit_login(&self, form: &LoginForm, method: LoginMethod) -> AuthFlowResult<()> {
        self.require_mode(FlowMode::Login)?;

        let errors = validate_login(form, method, &self.policy);
        if !self.accept_validation(errors) {
            return Ok(());
        }
        if !self.store.begin_attempt() {
            debug!("login submit ignored: attempt already in flight");
            return Ok(());
        }
        let ticket = self.ticket();
        self.notify();

        let credentials = match method {
            LoginMethod::Email => Credentials::Email {
                email: form.email.clone(),
                password: form.password.clone(),
            },
            LoginMethod::Otp => Credentials::Otp {
                phone: form.phone.clone(),
                otp: form.otp.clone(),
            },
        };
        let outcome = self.service.login(credentials).await;
        if !matches!(self.settle(ticket, outcome)?, Settled::Stale) {
            self.notify();
        }
        Ok(())
    }

    /// Submits the signup form. The email method calls the backend
    /// directly; the phone method captures the pending phone, enters OTP
    /// mode, and requests a code for it.
    pub async fn submit_signup(
        &self,
        form: &SignupForm,
        method: SignupMethod,
    ) -> AuthFlowResult<()> {
        self.require_mode(FlowMode::Signup)?;

        let errors = validate_signup(form, method, &self.policy);
        if !self.accept_validation(errors) {
            return Ok(());
        }
        if !self.store.begin_attempt() {
            debug!("signup submit ignored: attempt already in flight");
            return Ok(());
        }

        match method {
            SignupMethod::Email => {
                let ticket = self.ticket();
                self.notify();

                let request = SignupRequest {
                    first_name: form.first_name.trim().to_string(),
                    last_name: form.last_name.trim().to_string(),
                    contact: SignupContact::Email {
                        email: form.email.clone(),
                        password: form.password.clone(),
                    },
                };
                let outcome = self.service.signup(request).await;
                if !matches!(self.settle(ticket, outcome)?, Settled::Stale) {
                    self.notify();
                }
            }
            SignupMethod::Phone => {
                let phone = form.phone.clone();
                *self.pending_phone.lock().unwrap() = Some(phone.clone());
                self.transition(&FlowMachineInput::OtpRequested)?;
                let ticket = self.ticket();
                self.notify();

                let outcome = self.service.request_otp(&phone).await;
                if !matches!(self.settle(ticket, outcome)?, Settled::Stale) {
                    self.notify();
                }
            }
        }
        Ok(())
    }

    /// Verifies the entered OTP against the pending phone. On success the
    /// challenge is consumed and the user is installed in the session.
    pub async fn submit_otp(&self, otp: &str) -> AuthFlowResult<()> {
        self.require_mode(FlowMode::Otp)?;
        let phone = self
            .pending_phone()
            .ok_or(AuthFlowError::MissingPendingPhone)?;

        let form = OtpForm {
            phone: phone.clone(),
            otp: otp.to_string(),
        };
        let errors = validate_otp(&form, &self.policy);
        if !self.accept_validation(errors) {
            return Ok(());
        }
        if !self.store.begin_attempt() {
            debug!("otp submit ignored: attempt already in flight");
            return Ok(());
        }
        let ticket = self.ticket();
        self.notify();

        let challenge = OtpChallenge {
            phone,
            otp: otp.to_string(),
        };
        let outcome = self.service.verify_otp(challenge).await;
        match self.settle(ticket, outcome)? {
            Settled::Stale => {}
            Settled::Failure => self.notify(),
            Settled::Success => {
                *self.pending_phone.lock().unwrap() = None;
                self.notify();
            }
        }
        Ok(())
    }

    /// Re-requests an OTP for the pending phone. Not invocable while an
    /// attempt is in flight.
    pub async fn resend_otp(&self) -> AuthFlowResult<()> {
        self.require_mode(FlowMode::Otp)?;
        let phone = self
            .pending_phone()
            .ok_or(AuthFlowError::MissingPendingPhone)?;

        if !self.store.begin_attempt() {
            debug!("otp resend ignored: attempt already in flight");
            return Ok(());
        }
        self.transition(&FlowMachineInput::ResendRequested)?;
        let ticket = self.ticket();
        self.notify();

        let outcome = self.service.request_otp(&phone).await;
        if !matches!(self.settle(ticket, outcome)?, Settled::Stale) {
            self.notify();
        }
        Ok(())
    }

    /// Authenticates through the alternate Google credential source,
    /// bypassing local validation. Available from the tabbed view only.
    pub async fn google_login(&self) -> AuthFlowResult<()> {
        let mode = self.mode();
        if !mode.is_tabbed_view() {
            return Err(AuthFlowError::InvalidTransition(format!(
                "google login is not available in mode {mode:?}"
            )));
        }
        if !self.store.begin_attempt() {
            debug!("google login ignored: attempt already in flight");
            return Ok(());
        }
        let ticket = self.ticket();
        self.notify();

        let outcome = self.service.google_login().await;
        if !matches!(self.settle(ticket, outcome)?, Settled::Stale) {
            self.notify();
        }
        Ok(())
    }

    /// Switches to the Login tab. No-op while loading or when already
    /// there.
    pub fn select_login(&self) -> AuthFlowResult<()> {
        if self.mode() == FlowMode::Login {
            return Ok(());
        }
        if self.store.is_loading() {
            debug!("tab switch ignored while loading");
            return Ok(());
        }
        self.transition(&FlowMachineInput::LoginSelected)?;
        self.invalidate_attempts();
        self.validation_errors.lock().unwrap().clear_all();
        self.notify();
        Ok(())
    }

    /// Switches to the Signup tab. No-op while loading or when already
    /// there.
    pub fn select_signup(&self) -> AuthFlowResult<()> {
        if self.mode() == FlowMode::Signup {
            return Ok(());
        }
        if self.store.is_loading() {
            debug!("tab switch ignored while loading");
            return Ok(());
        }
        self.transition(&FlowMachineInput::SignupSelected)?;
        self.invalidate_attempts();
        self.validation_errors.lock().unwrap().clear_all();
        self.notify();
        Ok(())
    }

    /// The user toggled between methods on a form; all validation errors
    /// are cleared.
    pub fn method_changed(&self) {
        self.validation_errors.lock().unwrap().clear_all();
        self.notify();
    }

    /// The user edited a field; its validation error (if any) is cleared.
    pub fn field_changed(&self, field: Field) {
        let cleared = self.validation_errors.lock().unwrap().clear(field);
        if cleared {
            self.notify();
        }
    }

    /// Leaves the OTP view for the signup form, abandoning the pending
    /// challenge. Always available, including while a request is in
    /// flight: the abandoned settlement is discarded wholesale, so the
    /// loading flag is reset here.
    pub fn back_to_signup(&self) -> AuthFlowResult<()> {
        self.transition(&FlowMachineInput::BackToSignup)?;
        self.invalidate_attempts();
        *self.pending_phone.lock().unwrap() = None;
        self.store.set_loading(false);
        self.validation_errors.lock().unwrap().clear_all();
        self.notify();
        Ok(())
    }

    /// Ends the authenticated session and resets the flow so it can be
    /// re-entered: user and error cleared, mode back to Login, pending
    /// phone and validation errors dropped, in-flight attempts
    /// invalidated.
    pub fn logout(&self) {
        self.invalidate_attempts();
        self.store.logout();
        self.store.set_loading(false);
        *self.fsm.lock().unwrap() = FlowMachine::new();
        *self.pending_phone.lock().unwrap() = None;
        self.validation_errors.lock().unwrap().clear_all();
        info!("flow reset on logout");
        self.notify();
    }

    /// Stores the outcome of a validation run and notifies. Returns true
    /// when the submission may proceed.
    fn accept_validation(&self, errors: ValidationErrors) -> bool {
        let valid = errors.is_valid();
        *self.validation_errors.lock().unwrap() = errors;
        self.notify();
        valid
    }

    /// Applies a service outcome to the session store, unless the attempt
    /// went stale while the call was in flight.
    fn settle(
        &self,
        ticket: u64,
        outcome: Result<AuthResponse, ServiceError>,
    ) -> AuthFlowResult<Settled> {
        if self.ticket() != ticket {
            debug!("discarding stale auth response");
            return Ok(Settled::Stale);
        }
        match outcome {
            Ok(response) if response.success => {
                info!(message = %response.message, "auth attempt accepted");
                self.store.settle_success(response.user);
                self.transition(&FlowMachineInput::SubmitSucceeded)?;
                Ok(Settled::Success)
            }
            Ok(response) => {
                warn!(message = %response.message, "auth attempt rejected");
                self.store.settle_failure(response.message);
                self.transition(&FlowMachineInput::SubmitFailed)?;
                Ok(Settled::Failure)
            }
            Err(err) => {
                warn!(error = %err, transient = err.is_transient(), "auth service call failed");
                self.store.settle_failure(err.to_string());
                self.transition(&FlowMachineInput::SubmitFailed)?;
                Ok(Settled::Failure)
            }
        }
    }

    /// Consumes an FSM input, mapping rejected inputs to
    /// [`AuthFlowError::InvalidTransition`] and logging mode changes.
    fn transition(&self, input: &FlowMachineInput) -> AuthFlowResult<FlowMode> {
        let mut fsm = self.fsm.lock().unwrap();
        let old_mode = FlowMode::from(fsm.state());
        fsm.consume(input).map_err(|_| {
            AuthFlowError::InvalidTransition(format!(
                "cannot apply {:?} in mode {:?}",
                input,
                fsm.state()
            ))
        })?;
        let new_mode = FlowMode::from(fsm.state());
        drop(fsm);

        if old_mode != new_mode {
            debug!(?old_mode, ?new_mode, "flow mode transition");
        }
        Ok(new_mode)
    }

    fn require_mode(&self, expected: FlowMode) -> AuthFlowResult<()> {
        let mode = self.mode();
        if mode == expected {
            Ok(())
        } else {
            Err(AuthFlowError::InvalidTransition(format!(
                "expected mode {expected:?}, currently in {mode:?}"
            )))
        }
    }

    fn ticket(&self) -> u64 {
        self.attempt_gen.load(Ordering::SeqCst)
    }

    fn invalidate_attempts(&self) {
        self.attempt_gen.fetch_add(1, Ordering::SeqCst);
    }

    fn notify(&self) {
        let cb = self.snapshot_callback.lock().unwrap();
        if let Some(callback) = cb.as_ref() {
            callback(self.snapshot());
        }
    }
}
