use crate::service::ServiceError;
use crate::types::{ControllerDescriptor, ControllerId, ControllerStatus};

/// Result of a single request to the controller service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The service accepted the request.
    Success(T),
    /// The service was reachable but declined, optionally with a reason.
    Declined(Option<String>),
    /// The request did not complete.
    Unreachable(String),
}

impl<T> Outcome<T> {
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Outcome<U> {
        match self {
            Outcome::Success(value) => Outcome::Success(f(value)),
            Outcome::Declined(reason) => Outcome::Declined(reason),
            Outcome::Unreachable(err) => Outcome::Unreachable(err),
        }
    }

    /// Collapse a service call into an outcome. `Ok(None)` means declined.
    pub(crate) fn from_reply(reply: Result<std::result::Result<T, Option<String>>, ServiceError>) -> Self {
        match reply {
            Ok(Ok(value)) => Outcome::Success(value),
            Ok(Err(reason)) => Outcome::Declined(reason),
            Err(err) => Outcome::Unreachable(err.to_string()),
        }
    }
}

/// Everything that can move the session state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Host started the session: refresh once and arm polling.
    Start,
    /// Host disposed the session.
    Teardown,
    /// Polling timer fired.
    Tick,
    /// Operator asked for a refresh.
    RefreshRequested,
    /// Operator picked a controller.
    Select(ControllerId),
    /// Operator asked to activate a controller, or the current selection.
    ActivateRequested(Option<ControllerId>),
    /// Operator asked to release the active controller.
    DeactivateRequested,
    RefreshCompleted {
        ticket: u64,
        outcome: Outcome<Vec<ControllerDescriptor>>,
    },
    ActivateCompleted {
        ticket: u64,
        outcome: Outcome<()>,
    },
    DeactivateCompleted {
        ticket: u64,
        outcome: Outcome<()>,
    },
    /// Status pushed by the controller service.
    Pushed(ControllerStatus),
}
