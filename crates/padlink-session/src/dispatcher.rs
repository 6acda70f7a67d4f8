use std::sync::Arc;
use std::thread;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

use crate::error::{Error, Result};
use crate::events::{Outcome, SessionEvent};
use crate::service::{CommandReply, ControllerService, RefreshReply};
use crate::types::ControllerId;

/// Requests queued for the worker thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Job {
    Refresh { ticket: u64 },
    Activate { ticket: u64, id: ControllerId },
    Deactivate { ticket: u64 },
}

/// Runs controller service calls off the event loop and feeds their outcomes
/// back as session events.
pub(crate) struct Dispatcher {
    job_tx: Option<Sender<Job>>,
}

impl Dispatcher {
    pub(crate) fn start(
        service: Arc<dyn ControllerService>,
        events: Sender<SessionEvent>,
    ) -> Result<Self> {
        let (job_tx, job_rx) = unbounded::<Job>();
        thread::Builder::new()
            .name("padlink-dispatcher".into())
            .spawn(move || worker_loop(service.as_ref(), &job_rx, &events))?;
        Ok(Self {
            job_tx: Some(job_tx),
        })
    }

    pub(crate) fn send(&self, job: Job) -> Result<()> {
        let Some(tx) = self.job_tx.as_ref() else {
            return Err(Error::DispatcherStopped);
        };
        tx.send(job).map_err(|_| Error::DispatcherStopped)
    }

    /// Stop accepting jobs. Requests already running are left to finish.
    pub(crate) fn shutdown(&mut self) {
        self.job_tx = None;
    }
}

fn worker_loop(
    service: &dyn ControllerService,
    jobs: &Receiver<Job>,
    events: &Sender<SessionEvent>,
) {
    while let Ok(job) = jobs.recv() {
        debug!("dispatching {job:?}");
        let event = run_job(service, job);
        if events.send(event).is_err() {
            break;
        }
    }
    debug!("dispatcher stopped");
}

pub(crate) fn run_job(service: &dyn ControllerService, job: Job) -> SessionEvent {
    match job {
        Job::Refresh { ticket } => SessionEvent::RefreshCompleted {
            ticket,
            outcome: Outcome::from_reply(service.refresh().map(RefreshReply::into_result)),
        },
        Job::Activate { ticket, id } => SessionEvent::ActivateCompleted {
            ticket,
            outcome: Outcome::from_reply(service.activate(&id).map(CommandReply::into_result)),
        },
        Job::Deactivate { ticket } => SessionEvent::DeactivateCompleted {
            ticket,
            outcome: Outcome::from_reply(service.deactivate().map(CommandReply::into_result)),
        },
    }
}
