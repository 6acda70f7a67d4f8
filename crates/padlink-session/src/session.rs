use log::{debug, info};

use crate::effect::Effect;
use crate::events::{Outcome, SessionEvent};
use crate::types::{ControllerDescriptor, ControllerId, ControllerStatus, Notice};
use crate::view::{SessionStatus, SessionView};

const TRANSPORT_FAILURE: &str = "Failed to communicate with the server";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Idle,
    Activating {
        id: ControllerId,
    },
    Active {
        deactivating: bool,
        deactivation_failed: bool,
    },
}

/// Controller session state machine.
///
/// Every transition goes through [`Session::handle_with`], which mutates the
/// state and reports the side effects it needs through a sink. Polling is
/// derived from the phase after each event, so the timer is armed exactly
/// when the session is started, not torn down and neither activating nor
/// active.
#[derive(Debug, Clone)]
pub struct Session {
    controllers: Vec<ControllerDescriptor>,
    selected: Option<ControllerId>,
    phase: Phase,
    polling: bool,
    started: bool,
    torn_down: bool,
    refresh_in_flight: bool,
    refresh_ticket: u64,
    // Refreshes issued at or before this ticket predate the last activation.
    refresh_barrier: u64,
    activate_ticket: u64,
    deactivate_ticket: u64,
    // Requests whose reply is still owed. A push may move the phase while
    // one is outstanding; the reply then only confirms what the push did.
    pending_activate: Option<u64>,
    pending_deactivate: Option<u64>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            controllers: Vec::new(),
            selected: None,
            phase: Phase::Idle,
            polling: false,
            started: false,
            torn_down: false,
            refresh_in_flight: false,
            refresh_ticket: 0,
            refresh_barrier: 0,
            activate_ticket: 0,
            deactivate_ticket: 0,
            pending_activate: None,
            pending_deactivate: None,
        }
    }

    pub fn controllers(&self) -> &[ControllerDescriptor] {
        &self.controllers
    }

    pub fn selected(&self) -> Option<&ControllerId> {
        self.selected.as_ref()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active { .. })
    }

    pub fn is_polling(&self) -> bool {
        self.polling
    }

    pub fn is_refreshing(&self) -> bool {
        self.refresh_in_flight
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    pub fn deactivation_failed(&self) -> bool {
        matches!(
            self.phase,
            Phase::Active {
                deactivation_failed: true,
                ..
            }
        )
    }

    pub fn status(&self) -> SessionStatus {
        match (&self.phase, &self.selected) {
            (Phase::Active { .. }, selected) => SessionStatus::Active(selected.clone()),
            (Phase::Activating { id, .. }, _) => SessionStatus::Activating(id.clone()),
            (Phase::Idle, None) => SessionStatus::NoSelection,
            (Phase::Idle, Some(id)) if self.is_listed(id) => SessionStatus::Selected(id.clone()),
            (Phase::Idle, Some(id)) => SessionStatus::SelectionStale(id.clone()),
        }
    }

    pub fn view(&self) -> SessionView {
        SessionView {
            controllers: self.controllers.clone(),
            selected: self.selected.clone(),
            active: self.is_active(),
            status: self.status(),
            refresh_busy: self.refresh_in_flight,
            deactivation_failed: self.deactivation_failed(),
            polling: self.polling,
        }
    }

    /// Apply one event, reporting requested side effects to `sink` in order.
    pub fn handle_with<F: FnMut(Effect)>(&mut self, event: SessionEvent, mut sink: F) {
        if self.torn_down {
            debug!("session torn down, dropping {event:?}");
            return;
        }

        match event {
            SessionEvent::Start => {
                if self.started {
                    return;
                }
                self.started = true;
                self.issue_refresh(&mut sink);
            }
            SessionEvent::Teardown => {
                self.torn_down = true;
            }
            SessionEvent::Tick => self.on_tick(&mut sink),
            SessionEvent::RefreshRequested => self.issue_refresh(&mut sink),
            SessionEvent::Select(id) => self.on_select(id),
            SessionEvent::ActivateRequested(id) => self.on_activate_requested(id, &mut sink),
            SessionEvent::DeactivateRequested => self.on_deactivate_requested(&mut sink),
            SessionEvent::RefreshCompleted { ticket, outcome } => {
                self.on_refresh_completed(ticket, outcome, &mut sink);
            }
            SessionEvent::ActivateCompleted { ticket, outcome } => {
                self.on_activate_completed(ticket, outcome, &mut sink);
            }
            SessionEvent::DeactivateCompleted { ticket, outcome } => {
                self.on_deactivate_completed(ticket, outcome, &mut sink);
            }
            SessionEvent::Pushed(status) => self.on_pushed(status),
        }

        self.sync_polling(&mut sink);
    }

    fn is_listed(&self, id: &ControllerId) -> bool {
        self.controllers.iter().any(|c| &c.id == id)
    }

    fn wants_polling(&self) -> bool {
        self.started && !self.torn_down && self.phase == Phase::Idle
    }

    fn sync_polling<F: FnMut(Effect)>(&mut self, sink: &mut F) {
        let armed = self.wants_polling();
        if armed == self.polling {
            return;
        }
        self.polling = armed;
        sink(if armed {
            Effect::ArmPolling
        } else {
            Effect::DisarmPolling
        });
    }

    fn issue_refresh<F: FnMut(Effect)>(&mut self, sink: &mut F) {
        if self.refresh_in_flight {
            debug!("refresh already in flight");
            return;
        }
        self.refresh_ticket += 1;
        self.refresh_in_flight = true;
        sink(Effect::Refresh {
            ticket: self.refresh_ticket,
        });
    }

    fn on_tick<F: FnMut(Effect)>(&mut self, sink: &mut F) {
        if !self.started || self.phase != Phase::Idle {
            debug!("ignoring poll tick while controller is engaged");
            return;
        }
        self.issue_refresh(sink);
    }

    fn on_select(&mut self, id: ControllerId) {
        if self.phase != Phase::Idle {
            debug!("ignoring selection of {id} while controller is engaged");
            return;
        }
        self.selected = Some(id);
    }

    fn on_activate_requested<F: FnMut(Effect)>(&mut self, id: Option<ControllerId>, sink: &mut F) {
        if self.phase != Phase::Idle {
            debug!("activation already in progress or active");
            return;
        }
        if let Some(id) = id {
            self.selected = Some(id);
        }
        let Some(id) = self.selected.clone() else {
            debug!("activation requested without a selected controller");
            return;
        };

        self.activate_ticket += 1;
        self.pending_activate = Some(self.activate_ticket);
        self.refresh_barrier = self.refresh_ticket;
        self.phase = Phase::Activating { id: id.clone() };
        self.sync_polling(sink);
        sink(Effect::Activate {
            ticket: self.activate_ticket,
            id,
        });
    }

    fn on_activate_completed<F: FnMut(Effect)>(
        &mut self,
        ticket: u64,
        outcome: Outcome<()>,
        sink: &mut F,
    ) {
        if self.pending_activate != Some(ticket) {
            debug!("dropping superseded activation result #{ticket}");
            return;
        }
        self.pending_activate = None;

        let activating = matches!(self.phase, Phase::Activating { .. });
        match outcome {
            Outcome::Success(()) if activating => {
                self.phase = Phase::Active {
                    deactivating: false,
                    deactivation_failed: false,
                };
                sink(Effect::Notify(activated_notice()));
            }
            Outcome::Declined(reason) if activating => {
                self.phase = Phase::Idle;
                sink(Effect::Notify(Notice::error(
                    "Activation Failed",
                    reason.unwrap_or_else(|| "Failed to activate controller".into()),
                )));
            }
            Outcome::Unreachable(err) if activating => {
                debug!("activation request failed: {err}");
                self.phase = Phase::Idle;
                sink(Effect::Notify(Notice::error(
                    "Activation Failed",
                    TRANSPORT_FAILURE,
                )));
            }
            // A push already reported the binding.
            Outcome::Success(()) if self.is_active() => {
                sink(Effect::Notify(activated_notice()));
            }
            outcome => {
                debug!(
                    "activation result #{ticket} overtaken by push ({:?}): {outcome:?}",
                    self.phase
                );
            }
        }
    }

    fn on_deactivate_requested<F: FnMut(Effect)>(&mut self, sink: &mut F) {
        let Phase::Active {
            deactivating,
            deactivation_failed,
        } = &mut self.phase
        else {
            debug!("deactivation requested while no controller is active");
            return;
        };
        if *deactivating {
            debug!("deactivation already in flight");
            return;
        }
        *deactivating = true;
        *deactivation_failed = false;
        self.deactivate_ticket += 1;
        self.pending_deactivate = Some(self.deactivate_ticket);
        sink(Effect::Deactivate {
            ticket: self.deactivate_ticket,
        });
    }

    fn on_deactivate_completed<F: FnMut(Effect)>(
        &mut self,
        ticket: u64,
        outcome: Outcome<()>,
        sink: &mut F,
    ) {
        if self.pending_deactivate != Some(ticket) {
            debug!("dropping superseded deactivation result #{ticket}");
            return;
        }
        self.pending_deactivate = None;

        let deactivating = matches!(
            self.phase,
            Phase::Active {
                deactivating: true,
                ..
            }
        );
        let reason = match outcome {
            Outcome::Success(()) if deactivating => {
                self.phase = Phase::Idle;
                sink(Effect::Notify(deactivated_notice()));
                return;
            }
            // A push already reported the release.
            Outcome::Success(()) if self.phase == Phase::Idle => {
                sink(Effect::Notify(deactivated_notice()));
                return;
            }
            Outcome::Declined(reason) if deactivating => {
                reason.unwrap_or_else(|| "Failed to deactivate controller".into())
            }
            Outcome::Unreachable(err) if deactivating => {
                debug!("deactivation request failed: {err}");
                TRANSPORT_FAILURE.into()
            }
            outcome => {
                debug!(
                    "deactivation result #{ticket} overtaken by push ({:?}): {outcome:?}",
                    self.phase
                );
                return;
            }
        };
        self.phase = Phase::Active {
            deactivating: false,
            deactivation_failed: true,
        };
        sink(Effect::Notify(Notice::error("Deactivation Failed", reason)));
    }

    fn on_refresh_completed<F: FnMut(Effect)>(
        &mut self,
        ticket: u64,
        outcome: Outcome<Vec<ControllerDescriptor>>,
        sink: &mut F,
    ) {
        if ticket == self.refresh_ticket {
            self.refresh_in_flight = false;
        }
        if ticket <= self.refresh_barrier {
            debug!("dropping refresh #{ticket} issued before the last activation");
            return;
        }

        match outcome {
            Outcome::Success(controllers) => {
                let count = controllers.len();
                self.apply_controllers(controllers);
                sink(Effect::Notify(Notice::success(
                    "Controllers Refreshed",
                    format!("{count} controller(s) found"),
                )));
            }
            Outcome::Declined(reason) => {
                sink(Effect::Notify(Notice::error(
                    "Refresh Failed",
                    reason.unwrap_or_else(|| "Failed to refresh controllers".into()),
                )));
            }
            Outcome::Unreachable(err) => {
                debug!("refresh request failed: {err}");
                sink(Effect::Notify(Notice::error("Refresh Failed", TRANSPORT_FAILURE)));
            }
        }
    }

    fn apply_controllers(&mut self, controllers: Vec<ControllerDescriptor>) {
        self.controllers = controllers;
        if self.selected.is_none() {
            self.selected = self.controllers.first().map(|c| c.id.clone());
        }

        let vanished = match &self.selected {
            Some(id) => !self.is_listed(id),
            None => false,
        };
        if vanished {
            if let Some(id) = self.selected.take() {
                info!("selected controller {id} is no longer available");
            }
            self.phase = Phase::Idle;
        }
    }

    fn on_pushed(&mut self, status: ControllerStatus) {
        debug!(
            "controller status push - active={} id={:?}",
            status.active, status.controller_id
        );
        if let Some(id) = status.controller_id {
            self.selected = Some(id);
        }
        if status.active {
            if !self.is_active() {
                self.phase = Phase::Active {
                    deactivating: false,
                    deactivation_failed: false,
                };
            }
        } else {
            self.phase = Phase::Idle;
        }
    }
}

fn activated_notice() -> Notice {
    Notice::success("Controller Activated", "Controller is now active")
}

fn deactivated_notice() -> Notice {
    Notice::info("Controller Deactivated", "Controller is now inactive")
}
