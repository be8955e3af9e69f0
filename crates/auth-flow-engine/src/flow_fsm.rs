//! Mode state machine for the authentication flow, using rust-fsm.
//!
//! The flow is always in exactly one mode. Submissions settle as
//! self-transitions (a successful login is signaled to the caller through
//! the session store, not through a mode change), while tab selection, the
//! phone-signup handoff, and the OTP back action move between modes.
//!
//! ## State Diagram
//!
//! ```text
//!             SignupSelected
//! ┌─────────┐ ─────────────► ┌─────────┐
//! │  Login  │                │ Signup  │
//! │(initial)│ ◄───────────── └────┬────┘
//! └─────────┘  LoginSelected      │ OtpRequested
//!                                 │ (pending phone captured)
//!              BackToSignup       ▼
//!             ◄───────────── ┌─────────┐
//!                            │   Otp   │ ──┐ ResendRequested
//!                            └─────────┘ ◄─┘
//! ```
//!
//! `SubmitSucceeded` / `SubmitFailed` are accepted in every mode and leave
//! the mode unchanged.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

// Generates a module `flow_machine` with:
// - flow_machine::State (enum)
// - flow_machine::Input (enum)
// - flow_machine::StateMachine (type alias)
state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub flow_machine(Login)

    Login => {
        SignupSelected => Signup,
        SubmitSucceeded => Login,
        SubmitFailed => Login
    },
    Signup => {
        LoginSelected => Login,
        OtpRequested => Otp,
        SubmitSucceeded => Signup,
        SubmitFailed => Signup
    },
    Otp => {
        BackToSignup => Signup,
        ResendRequested => Otp,
        SubmitSucceeded => Otp,
        SubmitFailed => Otp
    }
}

// Re-export the generated types with clearer names
pub use flow_machine::Input as FlowMachineInput;
pub use flow_machine::State as FlowMachineState;
pub use flow_machine::StateMachine as FlowMachine;

/// The flow's current mode, for external consumption.
///
/// The original page also had an `"email"` mode value, reachable from an
/// "Or continue with" toggle; it matched no view branch and fell through
/// to the tabbed login/signup view. Email-vs-OTP is a login method
/// selector, not a mode, so it lives in
/// [`LoginMethod`](auth_form_validation::LoginMethod) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowMode {
    /// Login tab of the credential view.
    Login,
    /// Signup tab of the credential view.
    Signup,
    /// OTP verification for a pending phone signup.
    Otp,
}

impl FlowMode {
    /// Returns true for the tabbed login/signup view (where the Google
    /// button is rendered).
    pub fn is_tabbed_view(&self) -> bool {
        matches!(self, FlowMode::Login | FlowMode::Signup)
    }
}

impl From<&FlowMachineState> for FlowMode {
    fn from(state: &FlowMachineState) -> Self {
        match state {
            FlowMachineState::Login => FlowMode::Login,
            FlowMachineState::Signup => FlowMode::Signup,
            FlowMachineState::Otp => FlowMode::Otp,
        }
    }
}
