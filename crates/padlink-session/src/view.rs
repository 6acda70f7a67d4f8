use crate::types::{ControllerDescriptor, ControllerId};

/// Session status as shown to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    NoSelection,
    Selected(ControllerId),
    /// The selected controller is not in the last refreshed list.
    SelectionStale(ControllerId),
    Activating(ControllerId),
    /// Bound by the service. The id is missing only when a push reported
    /// activity without naming the controller and nothing was selected.
    Active(Option<ControllerId>),
}

/// Read-only snapshot of the session handed to the rendering layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionView {
    pub controllers: Vec<ControllerDescriptor>,
    pub selected: Option<ControllerId>,
    pub active: bool,
    pub status: SessionStatus,
    pub refresh_busy: bool,
    pub deactivation_failed: bool,
    pub polling: bool,
}

impl SessionView {
    pub fn status_text(&self) -> &'static str {
        match self.status {
            SessionStatus::Active(_) => "Controller active",
            SessionStatus::Activating(_) => "Activating controller",
            SessionStatus::Selected(_) | SessionStatus::SelectionStale(_) => {
                "Controller inactive"
            }
            SessionStatus::NoSelection => "No controller selected",
        }
    }
}
