use crate::types::{ControllerId, Notice};

/// Side effects requested by the session reducer, performed by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Refresh { ticket: u64 },
    Activate { ticket: u64, id: ControllerId },
    Deactivate { ticket: u64 },
    ArmPolling,
    DisarmPolling,
    Notify(Notice),
}
