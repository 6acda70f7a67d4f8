mod controller;
mod dispatcher;
mod effect;
mod error;
mod events;
mod notifier;
mod poller;
mod push;
mod service;
mod session;
mod types;
mod view;

pub use crate::controller::SessionController;
pub use crate::effect::Effect;
pub use crate::error::{Error, Result};
pub use crate::events::{Outcome, SessionEvent};
pub use crate::notifier::Notifier;
pub use crate::poller::{Poller, DEFAULT_POLL_INTERVAL};
pub use crate::push::{decode_push, CONTROLLER_STATUS};
pub use crate::service::{CommandReply, ControllerService, RefreshReply, ServiceError};
pub use crate::session::Session;
pub use crate::types::{
    ControllerDescriptor, ControllerId, ControllerStatus, Notice, Severity,
};
pub use crate::view::{SessionStatus, SessionView};
