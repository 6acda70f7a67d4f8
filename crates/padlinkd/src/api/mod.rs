mod unix_sock;

use std::thread::JoinHandle;

pub use unix_sock::UnixSocket;

use bitcode::{Decode, Encode};
use crossbeam_channel::Sender;
use padlink_session::SessionEvent;
use thiserror::Error;

/// Error type for api operations.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("control socket error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("daemon rejected command: {0}")]
    Rejected(String),
}

/// Convenient result alias for api operations.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// padlinkd api control command.
#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Command {
    Refresh,
    Activate { id: Option<String> },
    Deactivate,
    Select { id: String },
}

impl Command {
    pub fn into_event(self) -> SessionEvent {
        match self {
            Command::Refresh => SessionEvent::RefreshRequested,
            Command::Activate { id } => SessionEvent::ActivateRequested(id),
            Command::Deactivate => SessionEvent::DeactivateRequested,
            Command::Select { id } => SessionEvent::Select(id),
        }
    }
}

/// padlinkd api events transport.
/// listener that feeds commands from the outer world into the session,
/// and sender that delivers commands from the outer world to padlinkd.
pub trait ApiTransport {
    fn listen_events(&self, tx: Sender<SessionEvent>) -> ApiResult<JoinHandle<()>>;
    fn send_event(&self, event: Command) -> ApiResult<()>;
}
