//! Authentication flow engine.
//!
//! This crate provides:
//! - An explicit FSM for the login / signup / OTP mode transitions
//! - A session store holding loading / error / user state
//! - The `AuthenticationService` contract the flow delegates to
//! - The `AuthFlow` orchestrator tying the pieces together
//!
//! The engine is presentation-agnostic: a UI layer feeds events in
//! (submit, method change, back, resend, logout) and renders the
//! [`FlowSnapshot`] it gets back. All backend interaction goes through an
//! injected [`AuthenticationService`] implementation, so the flow is fully
//! testable with deterministic fakes.

mod error;
mod flow;
mod flow_fsm;
mod service;
mod session;

pub use error::{AuthFlowError, AuthFlowResult, ServiceError};
pub use flow::{AuthFlow, FlowSnapshot, SnapshotCallback};
pub use flow_fsm::flow_machine;
pub use flow_fsm::{FlowMachine, FlowMachineInput, FlowMachineState, FlowMode};
pub use service::{
    AuthResponse, AuthenticationService, Credentials, OtpChallenge, SignupContact, SignupRequest,
};
pub use session::{AuthSession, AuthSessionStore, User};
