use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{select, unbounded, Receiver, Sender};
use log::debug;

use crate::dispatcher::{Dispatcher, Job};
use crate::effect::Effect;
use crate::error::Result;
use crate::events::{Outcome, SessionEvent};
use crate::notifier::Notifier;
use crate::poller::Poller;
use crate::service::ControllerService;
use crate::session::Session;
use crate::view::SessionView;

/// Owns the session state and drives it from a single event loop.
///
/// Service replies, push notifications and operator requests all arrive as
/// [`SessionEvent`]s on one channel; obtain a sender with
/// [`SessionController::sender`].
pub struct SessionController {
    session: Session,
    poller: Poller,
    dispatcher: Dispatcher,
    notifier: Box<dyn Notifier>,
    events_tx: Sender<SessionEvent>,
    events_rx: Receiver<SessionEvent>,
    subscribers: Vec<Sender<SessionView>>,
    last_view: SessionView,
}

impl SessionController {
    /// Wires the controller to its collaborators and starts the request worker.
    /// Nothing is requested until [`SessionController::start`].
    pub fn new(
        service: Arc<dyn ControllerService>,
        notifier: Box<dyn Notifier>,
        poll_interval: Duration,
    ) -> Result<Self> {
        let (events_tx, events_rx) = unbounded();
        let dispatcher = Dispatcher::start(service, events_tx.clone())?;
        let session = Session::new();
        let last_view = session.view();
        Ok(Self {
            session,
            poller: Poller::new(poll_interval),
            dispatcher,
            notifier,
            events_tx,
            events_rx,
            subscribers: Vec::new(),
            last_view,
        })
    }

    /// Sender for feeding events (operator commands, pushes) into the loop.
    pub fn sender(&self) -> Sender<SessionEvent> {
        self.events_tx.clone()
    }

    /// Subscribes to view updates. Dropped subscribers are cleaned automatically.
    pub fn subscribe(&mut self) -> Receiver<SessionView> {
        let (tx, rx) = unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn view(&self) -> SessionView {
        self.session.view()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Whether the polling timer is currently live.
    pub fn is_polling(&self) -> bool {
        self.poller.is_armed()
    }

    /// Performs the first refresh and arms polling.
    pub fn start(&mut self) {
        self.handle(SessionEvent::Start);
    }

    /// Disarms polling and stops reacting to further events.
    pub fn teardown(&mut self) {
        self.handle(SessionEvent::Teardown);
        self.dispatcher.shutdown();
    }

    /// Applies one event and performs the effects it produces.
    pub fn handle(&mut self, event: SessionEvent) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            let mut effects = Vec::new();
            self.session.handle_with(event, |effect| effects.push(effect));
            for effect in effects {
                if let Some(followup) = self.perform(effect) {
                    queue.push_back(followup);
                }
            }
        }
        self.publish();
    }

    /// Waits up to `timeout` for one event or poll tick and handles it.
    /// Returns `false` if nothing arrived.
    pub fn step(&mut self, timeout: Duration) -> bool {
        let events = self.events_rx.clone();
        let ticks = self.poller.ticks().clone();
        select! {
            recv(events) -> msg => {
                if let Ok(event) = msg {
                    self.handle(event);
                }
                true
            }
            recv(ticks) -> _ => {
                self.handle(SessionEvent::Tick);
                true
            }
            default(timeout) => false,
        }
    }

    /// Runs the event loop until `stop` fires or disconnects, then tears down.
    pub fn run(&mut self, stop: &Receiver<()>) {
        let events = self.events_rx.clone();
        loop {
            let ticks = self.poller.ticks().clone();
            select! {
                recv(stop) -> _ => break,
                recv(events) -> msg => {
                    if let Ok(event) = msg {
                        self.handle(event);
                    }
                }
                recv(ticks) -> _ => self.handle(SessionEvent::Tick),
            }
        }
        self.teardown();
    }

    fn perform(&mut self, effect: Effect) -> Option<SessionEvent> {
        match effect {
            Effect::Refresh { ticket } => self.dispatch(Job::Refresh { ticket }),
            Effect::Activate { ticket, id } => self.dispatch(Job::Activate { ticket, id }),
            Effect::Deactivate { ticket } => self.dispatch(Job::Deactivate { ticket }),
            Effect::ArmPolling => {
                debug!("polling armed every {:?}", self.poller.interval());
                self.poller.arm();
                None
            }
            Effect::DisarmPolling => {
                debug!("polling disarmed");
                self.poller.disarm();
                None
            }
            Effect::Notify(notice) => {
                self.notifier
                    .notify(&notice.title, &notice.text, notice.severity);
                None
            }
        }
    }

    /// Queue a request; if the worker is gone, answer it locally as unreachable.
    fn dispatch(&self, job: Job) -> Option<SessionEvent> {
        let err = self.dispatcher.send(job.clone()).err()?;
        let outcome = Outcome::Unreachable(err.to_string());
        Some(match job {
            Job::Refresh { ticket } => SessionEvent::RefreshCompleted {
                ticket,
                outcome: outcome.map(|()| Vec::new()),
            },
            Job::Activate { ticket, .. } => SessionEvent::ActivateCompleted { ticket, outcome },
            Job::Deactivate { ticket } => SessionEvent::DeactivateCompleted { ticket, outcome },
        })
    }

    fn publish(&mut self) {
        let view = self.session.view();
        if view == self.last_view {
            return;
        }
        self.subscribers.retain(|tx| tx.send(view.clone()).is_ok());
        self.last_view = view;
    }
}
