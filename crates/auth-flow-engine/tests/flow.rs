//! End-to-end tests for the authentication flow against a scripted fake
//! service.

use auth_flow_engine::{
    AuthFlow, AuthFlowError, AuthResponse, AuthSessionStore, AuthenticationService, Credentials,
    FlowMode, OtpChallenge, ServiceError, SignupRequest, User,
};
use auth_form_validation::{LoginForm, LoginMethod, SignupForm, SignupMethod};
use chrono::Utc;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;
use tokio::task::yield_now;

type Scripted = Result<AuthResponse, ServiceError>;

/// Fake backend: per-method response queues, a call log, and an optional
/// gate that keeps every call in flight until released.
#[derive(Default)]
struct FakeService {
    calls: Mutex<Vec<String>>,
    responses: Mutex<HashMap<&'static str, VecDeque<Scripted>>>,
    gate: Mutex<Option<Arc<Notify>>>,
}

impl FakeService {
    fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn script(&self, method: &'static str, response: Scripted) {
        self.responses
            .lock()
            .unwrap()
            .entry(method)
            .or_default()
            .push_back(response);
    }

    fn gate_calls(&self, gate: Arc<Notify>) {
        *self.gate.lock().unwrap() = Some(gate);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn call(&self, method: &'static str, detail: String) -> Scripted {
        self.calls.lock().unwrap().push(detail);
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.responses
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| Ok(AuthResponse::rejected("no scripted response")))
    }
}

impl AuthenticationService for FakeService {
    async fn login(&self, credentials: Credentials) -> Scripted {
        let detail = match &credentials {
            Credentials::Email { email, .. } => format!("login:{email}"),
            Credentials::Otp { phone, .. } => format!("login:{phone}"),
        };
        self.call("login", detail).await
    }

    async fn signup(&self, request: SignupRequest) -> Scripted {
        self.call("signup", format!("signup:{}", request.first_name))
            .await
    }

    async fn request_otp(&self, phone: &str) -> Scripted {
        self.call("request_otp", format!("request_otp:{phone}")).await
    }

    async fn verify_otp(&self, challenge: OtpChallenge) -> Scripted {
        self.call(
            "verify_otp",
            format!("verify_otp:{}:{}", challenge.phone, challenge.otp),
        )
        .await
    }

    async fn google_login(&self) -> Scripted {
        self.call("google_login", "google_login".to_string()).await
    }
}

/// The orphan rule forbids `impl AuthenticationService for Arc<FakeService>`
/// here, so the flow holds this delegating wrapper instead.
#[derive(Clone)]
struct SharedService(Arc<FakeService>);

impl AuthenticationService for SharedService {
    async fn login(&self, credentials: Credentials) -> Scripted {
        self.0.login(credentials).await
    }

    async fn signup(&self, request: SignupRequest) -> Scripted {
        self.0.signup(request).await
    }

    async fn request_otp(&self, phone: &str) -> Scripted {
        self.0.request_otp(phone).await
    }

    async fn verify_otp(&self, challenge: OtpChallenge) -> Scripted {
        self.0.verify_otp(challenge).await
    }

    async fn google_login(&self) -> Scripted {
        self.0.google_login().await
    }
}

fn user_with_email(email: &str) -> User {
    User {
        id: "user-1".to_string(),
        email: Some(email.to_string()),
        phone: None,
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        created_at: Utc::now(),
    }
}

fn user_with_phone(phone: &str) -> User {
    User {
        id: "user-2".to_string(),
        email: None,
        phone: Some(phone.to_string()),
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        created_at: Utc::now(),
    }
}

fn new_flow() -> (AuthFlow<SharedService>, Arc<FakeService>) {
    let service = FakeService::new();
    let flow = AuthFlow::new(SharedService(service.clone()), AuthSessionStore::new());
    (flow, service)
}

fn email_login_form() -> LoginForm {
    LoginForm {
        email: "a@b.com".to_string(),
        password: "secret1".to_string(),
        ..Default::default()
    }
}

fn phone_signup_form() -> SignupForm {
    SignupForm {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        phone: "+1 555 0100".to_string(),
        ..Default::default()
    }
}

/// Drives a fresh flow into OTP mode with a pending phone.
async fn enter_otp_mode(flow: &AuthFlow<SharedService>, service: &FakeService) {
    service.script("request_otp", Ok(AuthResponse::acknowledged("OTP sent")));
    flow.select_signup().unwrap();
    flow.submit_signup(&phone_signup_form(), SignupMethod::Phone)
        .await
        .unwrap();
    assert_eq!(flow.mode(), FlowMode::Otp);
}

#[tokio::test]
async fn login_success_installs_user_and_clears_error() {
    let (flow, service) = new_flow();
    service.script(
        "login",
        Ok(AuthResponse::accepted(
            "Login successful",
            user_with_email("a@b.com"),
        )),
    );
    flow.store().set_error(Some("stale error".to_string()));

    flow.submit_login(&email_login_form(), LoginMethod::Email)
        .await
        .unwrap();

    let session = flow.store().session();
    assert_eq!(session.user.unwrap().email.as_deref(), Some("a@b.com"));
    assert!(session.error.is_none());
    assert!(!session.is_loading);
    assert!(flow.is_authenticated());
    assert_eq!(service.calls(), vec!["login:a@b.com"]);
}

#[tokio::test]
async fn login_rejection_sets_error_and_stays_interactive() {
    let (flow, service) = new_flow();
    service.script("login", Ok(AuthResponse::rejected("Invalid credentials")));

    flow.submit_login(&email_login_form(), LoginMethod::Email)
        .await
        .unwrap();

    assert_eq!(flow.mode(), FlowMode::Login);
    assert_eq!(flow.store().error().as_deref(), Some("Invalid credentials"));
    assert!(!flow.store().is_loading());
}

#[tokio::test]
async fn transport_fault_surfaces_as_error_string() {
    let (flow, service) = new_flow();
    service.script("login", Err(ServiceError::NetworkUnavailable));

    flow.submit_login(&email_login_form(), LoginMethod::Email)
        .await
        .unwrap();

    assert_eq!(flow.store().error().as_deref(), Some("Network unavailable"));
    assert!(!flow.store().is_loading());
}

#[tokio::test]
async fn email_signup_success_stays_in_signup_and_authenticates() {
    let (flow, service) = new_flow();
    service.script(
        "signup",
        Ok(AuthResponse::accepted(
            "Account created successfully",
            user_with_email("john@doe.com"),
        )),
    );

    let form = SignupForm {
        first_name: "John".to_string(),
        last_name: "Doe".to_string(),
        email: "john@doe.com".to_string(),
        password: "secret1".to_string(),
        confirm_password: "secret1".to_string(),
        ..Default::default()
    };
    flow.select_signup().unwrap();
    flow.submit_signup(&form, SignupMethod::Email).await.unwrap();

    assert_eq!(flow.mode(), FlowMode::Signup);
    assert!(flow.is_authenticated());
    assert_eq!(service.calls(), vec!["signup:John"]);
}

#[tokio::test]
async fn phone_signup_requests_otp_for_pending_phone() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;

    assert_eq!(flow.pending_phone().as_deref(), Some("+1 555 0100"));
    assert!(flow.validation_errors().is_valid());
    assert!(!flow.store().is_loading());
    assert_eq!(service.calls(), vec!["request_otp:+1 555 0100"]);
}

#[tokio::test]
async fn otp_rejection_keeps_flow_in_otp_mode() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;
    service.script("verify_otp", Ok(AuthResponse::rejected("Invalid OTP")));

    flow.submit_otp("000000").await.unwrap();

    assert_eq!(flow.mode(), FlowMode::Otp);
    assert!(flow.store().error().is_some());
    assert_eq!(flow.pending_phone().as_deref(), Some("+1 555 0100"));
    assert!(!flow.is_authenticated());
}

#[tokio::test]
async fn otp_success_consumes_challenge() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;
    service.script(
        "verify_otp",
        Ok(AuthResponse::accepted(
            "Phone verified successfully",
            user_with_phone("+1 555 0100"),
        )),
    );

    flow.submit_otp("123456").await.unwrap();

    assert!(flow.is_authenticated());
    assert!(flow.pending_phone().is_none());
    assert!(flow.store().error().is_none());
    assert_eq!(
        service.calls().last().map(String::as_str),
        Some("verify_otp:+1 555 0100:123456")
    );
}

#[tokio::test]
async fn resend_reuses_pending_phone() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;
    service.script("request_otp", Ok(AuthResponse::acknowledged("OTP sent")));

    flow.resend_otp().await.unwrap();

    assert_eq!(
        service.calls(),
        vec!["request_otp:+1 555 0100", "request_otp:+1 555 0100"]
    );
    assert_eq!(flow.mode(), FlowMode::Otp);
}

#[tokio::test]
async fn resend_is_noop_while_loading() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;
    let calls_before = service.calls().len();

    flow.store().set_loading(true);
    flow.resend_otp().await.unwrap();

    assert_eq!(service.calls().len(), calls_before);
    flow.store().set_loading(false);
}

#[tokio::test]
async fn double_submit_makes_exactly_one_service_call() {
    let (flow, service) = new_flow();
    service.script(
        "login",
        Ok(AuthResponse::accepted(
            "Login successful",
            user_with_email("a@b.com"),
        )),
    );
    let gate = Arc::new(Notify::new());
    service.gate_calls(gate.clone());
    let form = email_login_form();

    tokio::join!(
        async {
            flow.submit_login(&form, LoginMethod::Email).await.unwrap();
        },
        async {
            // The first submit is already in flight when this one runs.
            flow.submit_login(&form, LoginMethod::Email).await.unwrap();
        },
        async {
            yield_now().await;
            gate.notify_one();
        },
    );

    assert_eq!(service.calls(), vec!["login:a@b.com"]);
    assert!(flow.is_authenticated());
}

#[tokio::test]
async fn back_while_verifying_discards_the_late_response() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;
    service.script(
        "verify_otp",
        Ok(AuthResponse::accepted(
            "Phone verified successfully",
            user_with_phone("+1 555 0100"),
        )),
    );
    let gate = Arc::new(Notify::new());
    service.gate_calls(gate.clone());

    tokio::join!(
        async {
            flow.submit_otp("123456").await.unwrap();
        },
        async {
            yield_now().await;
            // Leave the OTP view while the verify call is in flight.
            flow.back_to_signup().unwrap();
            gate.notify_one();
        },
    );

    // The accepted response arrived after "back" and must not be applied.
    assert_eq!(flow.mode(), FlowMode::Signup);
    assert!(!flow.is_authenticated());
    assert!(flow.pending_phone().is_none());
    assert!(!flow.store().is_loading());
}

#[tokio::test]
async fn flow_can_be_reentered_after_back() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;
    flow.back_to_signup().unwrap();

    service.script("request_otp", Ok(AuthResponse::acknowledged("OTP sent")));
    flow.submit_signup(&phone_signup_form(), SignupMethod::Phone)
        .await
        .unwrap();

    assert_eq!(flow.mode(), FlowMode::Otp);
    assert_eq!(flow.pending_phone().as_deref(), Some("+1 555 0100"));
}

#[tokio::test]
async fn google_login_bypasses_validation() {
    let (flow, service) = new_flow();
    service.script(
        "google_login",
        Ok(AuthResponse::accepted(
            "Google login successful",
            user_with_email("user@gmail.com"),
        )),
    );

    // No form data anywhere; the validator is never consulted.
    flow.google_login().await.unwrap();

    assert!(flow.validation_errors().is_valid());
    assert!(flow.is_authenticated());
    assert_eq!(service.calls(), vec!["google_login"]);
}

#[tokio::test]
async fn logout_resets_for_reentry() {
    let (flow, service) = new_flow();
    service.script(
        "login",
        Ok(AuthResponse::accepted(
            "Login successful",
            user_with_email("a@b.com"),
        )),
    );
    flow.submit_login(&email_login_form(), LoginMethod::Email)
        .await
        .unwrap();
    assert!(flow.is_authenticated());

    flow.logout();

    assert_eq!(flow.mode(), FlowMode::Login);
    assert!(!flow.is_authenticated());
    assert!(flow.store().error().is_none());

    // The flow accepts a fresh attempt after logout.
    service.script(
        "login",
        Ok(AuthResponse::accepted(
            "Login successful",
            user_with_email("a@b.com"),
        )),
    );
    flow.submit_login(&email_login_form(), LoginMethod::Email)
        .await
        .unwrap();
    assert!(flow.is_authenticated());
}

#[tokio::test]
async fn loading_brackets_every_attempt() {
    let (flow, service) = new_flow();
    service.script("login", Ok(AuthResponse::rejected("Invalid credentials")));

    let seen: Arc<Mutex<Vec<(bool, Option<String>)>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    flow.set_snapshot_callback(Box::new(move |snapshot| {
        sink.lock()
            .unwrap()
            .push((snapshot.is_loading, snapshot.error.clone()));
    }));

    flow.store().set_error(Some("old error".to_string()));
    flow.submit_login(&email_login_form(), LoginMethod::Email)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    // The attempt start clears the prior error and raises the loading flag.
    assert!(seen.contains(&(true, None)));
    // The settlement lowers it again with the new error in place.
    assert_eq!(
        seen.last(),
        Some(&(false, Some("Invalid credentials".to_string())))
    );
}

#[tokio::test]
async fn submit_otp_in_login_mode_is_mis_sequenced() {
    let (flow, _service) = new_flow();

    let result = flow.submit_otp("123456").await;
    assert!(matches!(result, Err(AuthFlowError::InvalidTransition(_))));
    assert!(!flow.store().is_loading());
}

#[tokio::test]
async fn submit_otp_after_consumed_challenge_is_rejected() {
    let (flow, service) = new_flow();
    enter_otp_mode(&flow, &service).await;
    service.script(
        "verify_otp",
        Ok(AuthResponse::accepted(
            "Phone verified successfully",
            user_with_phone("+1 555 0100"),
        )),
    );
    flow.submit_otp("123456").await.unwrap();
    assert!(flow.pending_phone().is_none());

    let result = flow.submit_otp("123456").await;
    assert!(matches!(result, Err(AuthFlowError::MissingPendingPhone)));
}
