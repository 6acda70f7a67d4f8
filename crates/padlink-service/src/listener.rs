use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam_channel::Sender;
use log::{debug, info, warn};
use tungstenite::stream::MaybeTlsStream;
use tungstenite::{Message, WebSocket};

use padlink_session::{decode_push, SessionEvent};

use crate::error::{HttpError, HttpResult};
use crate::http::{passive_login, ServiceConfig};

/// How often a blocked read wakes up to check for shutdown.
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// Why a websocket session ended.
#[derive(Debug, PartialEq, Eq)]
enum Exit {
    /// Server closed the socket; reconnect.
    Closed,
    /// Listener was stopped or the session went away.
    Stopped,
}

/// Background thread that turns push frames into session events.
pub struct PushListener {
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl PushListener {
    pub fn start(
        config: ServiceConfig,
        reconnect: Duration,
        events: Sender<SessionEvent>,
    ) -> HttpResult<Self> {
        config.validate()?;
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let handle = thread::Builder::new()
            .name("padlink-push".into())
            .spawn(move || listen_loop(&config, reconnect, &events, &flag))?;
        Ok(Self {
            stop,
            handle: Some(handle),
        })
    }

    /// Signal the thread and wait for it to exit.
    pub fn stop(mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

fn listen_loop(
    config: &ServiceConfig,
    reconnect: Duration,
    events: &Sender<SessionEvent>,
    stop: &AtomicBool,
) {
    while !stop.load(Ordering::SeqCst) {
        match listen_once(config, events, stop) {
            Ok(Exit::Stopped) => break,
            Ok(Exit::Closed) => info!("push socket closed, reconnecting in {reconnect:?}"),
            Err(err) => warn!("push socket failed: {err}, retrying in {reconnect:?}"),
        }
        if !sleep_unless_stopped(reconnect, stop) {
            break;
        }
    }
    debug!("push listener stopped");
}

fn sleep_unless_stopped(total: Duration, stop: &AtomicBool) -> bool {
    let mut left = total;
    while !left.is_zero() {
        if stop.load(Ordering::SeqCst) {
            return false;
        }
        let step = left.min(READ_TIMEOUT);
        thread::sleep(step);
        left -= step;
    }
    !stop.load(Ordering::SeqCst)
}

fn listen_once(
    config: &ServiceConfig,
    events: &Sender<SessionEvent>,
    stop: &AtomicBool,
) -> HttpResult<Exit> {
    let login = passive_login(config, &config.client()?)?;
    let url = config.push_url()?;
    let (mut socket, _) = tungstenite::connect(url.as_str())?;
    set_read_timeout(&socket)?;
    info!("push socket connected to {url}");

    if let Some(login) = login {
        socket.send(Message::text(login.auth_frame()))?;
    }

    loop {
        if stop.load(Ordering::SeqCst) {
            let _ = socket.close(None);
            return Ok(Exit::Stopped);
        }
        let message = match socket.read() {
            Ok(message) => message,
            Err(tungstenite::Error::Io(err)) if is_timeout(&err) => continue,
            Err(tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed) => {
                return Ok(Exit::Closed)
            }
            Err(err) => return Err(HttpError::from(err)),
        };
        match message {
            Message::Text(text) => {
                let Some(status) = decode_push(&text, &config.namespace) else {
                    continue;
                };
                debug!("push status: {status:?}");
                if events.send(SessionEvent::Pushed(status)).is_err() {
                    return Ok(Exit::Stopped);
                }
            }
            Message::Close(_) => return Ok(Exit::Closed),
            _ => {}
        }
    }
}

fn set_read_timeout(socket: &WebSocket<MaybeTlsStream<TcpStream>>) -> HttpResult<()> {
    match socket.get_ref() {
        MaybeTlsStream::Plain(stream) => stream.set_read_timeout(Some(READ_TIMEOUT))?,
        MaybeTlsStream::Rustls(stream) => stream.sock.set_read_timeout(Some(READ_TIMEOUT))?,
        _ => {}
    }
    Ok(())
}

fn is_timeout(err: &std::io::Error) -> bool {
    matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut)
}
