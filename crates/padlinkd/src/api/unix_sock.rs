use std::fs;
use std::io::{Read, Write};
use std::os::unix::net::{UnixListener, UnixStream};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use bitcode::{Decode, Encode};
use colored::Colorize;
use crossbeam_channel::Sender;
use padlink_session::SessionEvent;

use super::{ApiError, ApiResult, ApiTransport, Command};
use crate::{print_debug, print_error, print_info};

const SOCKET_FILE_NAME: &str = "api.sock";
const MAX_FRAME_LEN: usize = 64 * 1024;

#[derive(Encode, Decode)]
pub struct SocketCommand {
    command: Command,
}

pub struct UnixSocket {
    socket_path: PathBuf,
}

impl UnixSocket {
    pub fn new<P: AsRef<Path>>(workspace_path: P) -> Self {
        let socket_path = workspace_path.as_ref().join(SOCKET_FILE_NAME);

        Self { socket_path }
    }

    pub fn path(&self) -> &Path {
        &self.socket_path
    }

    /// Remove the socket file left by [`ApiTransport::listen_events`].
    pub fn cleanup(&self) {
        let _ = fs::remove_file(self.path());
    }
}

impl UnixSocket {
    fn handle_connection(mut stream: UnixStream, tx: &Sender<SessionEvent>) {
        let reply = match Self::read_command(&mut stream) {
            Ok(command) => {
                print_debug!("control command: {command:?}");
                if tx.send(command.into_event()).is_ok() {
                    "OK\n".to_string()
                } else {
                    "ERR session stopped\n".to_string()
                }
            }
            Err(err) => {
                print_error!("failed to read command: {err}");
                format!("ERR {err}\n")
            }
        };
        let _ = stream.write_all(reply.as_bytes());
    }

    fn read_command(stream: &mut UnixStream) -> Result<Command, String> {
        let mut length_buffer = [0u8; 4];
        stream
            .read_exact(&mut length_buffer)
            .map_err(|err| format!("read failed: {err}"))?;

        let length = u32::from_be_bytes(length_buffer) as usize;
        if length == 0 {
            return Err("empty".to_string());
        }
        if length > MAX_FRAME_LEN {
            return Err(format!("frame too large: {length}"));
        }

        let mut data_buffer = vec![0u8; length];
        stream
            .read_exact(&mut data_buffer)
            .map_err(|err| format!("read failed: {err}"))?;

        bitcode::decode::<SocketCommand>(&data_buffer)
            .map(|frame| frame.command)
            .map_err(|err| err.to_string())
    }
}

impl ApiTransport for UnixSocket {
    fn listen_events(&self, tx: Sender<SessionEvent>) -> ApiResult<JoinHandle<()>> {
        let socket_path = self.socket_path.clone();
        if socket_path.exists() {
            fs::remove_file(&socket_path)?;
        }
        let listener = UnixListener::bind(&socket_path)?;
        print_info!("unix socket api listening at {}", socket_path.display());

        let handle = thread::Builder::new()
            .name("padlinkd-socket-api".into())
            .spawn(move || {
                for stream in listener.incoming() {
                    match stream {
                        Ok(stream) => {
                            Self::handle_connection(stream, &tx);
                        }
                        Err(e) => {
                            print_error!("control socket accept error: {}", e);
                            break;
                        }
                    }
                }
            })?;
        Ok(handle)
    }

    fn send_event(&self, event: Command) -> ApiResult<()> {
        let mut stream = UnixStream::connect(&self.socket_path)?;
        let cmd = SocketCommand { command: event };
        let encoded = bitcode::encode(&cmd);
        let length = u32::try_from(encoded.len()).map_err(|_| {
            ApiError::Rejected(format!("frame too large: {}", encoded.len()))
        })?;
        let mut frame = Vec::with_capacity(encoded.len() + 4);
        frame.extend_from_slice(&length.to_be_bytes());
        frame.extend_from_slice(&encoded);
        stream.write_all(&frame)?;
        stream.flush()?;

        let mut reply = String::new();
        stream.read_to_string(&mut reply)?;
        match reply.trim_end().strip_prefix("ERR ") {
            Some(reason) => Err(ApiError::Rejected(reason.to_string())),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scratch(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join(format!("padlinkd-sock-{}-{name}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn command_reaches_session_channel() {
        let dir = scratch("roundtrip");
        let socket = UnixSocket::new(&dir);
        let (tx, rx) = crossbeam_channel::unbounded();
        socket.listen_events(tx).unwrap();

        socket
            .send_event(Command::Select { id: "pad-1".into() })
            .unwrap();
        socket.send_event(Command::Activate { id: None }).unwrap();

        let wait = Duration::from_secs(2);
        assert_eq!(rx.recv_timeout(wait).unwrap(), SessionEvent::Select("pad-1".into()));
        assert_eq!(rx.recv_timeout(wait).unwrap(), SessionEvent::ActivateRequested(None));
        socket.cleanup();
        assert!(!socket.path().exists());
    }

    fn raw_reply(socket: &UnixSocket, bytes: &[u8]) -> String {
        let mut stream = UnixStream::connect(socket.path()).unwrap();
        stream.write_all(bytes).unwrap();
        stream.shutdown(std::net::Shutdown::Write).unwrap();
        let mut reply = String::new();
        stream.read_to_string(&mut reply).unwrap();
        reply
    }

    #[test]
    fn malformed_frames_are_rejected() {
        let dir = scratch("malformed");
        let socket = UnixSocket::new(&dir);
        let (tx, rx) = crossbeam_channel::unbounded();
        socket.listen_events(tx).unwrap();

        assert_eq!(raw_reply(&socket, &0u32.to_be_bytes()), "ERR empty\n");

        let mut truncated = 10u32.to_be_bytes().to_vec();
        truncated.extend_from_slice(&[1, 2]);
        assert!(raw_reply(&socket, &truncated).starts_with("ERR read failed"));

        assert!(rx.try_recv().is_err());
        socket.cleanup();
    }

    #[test]
    fn oversized_frame_is_rejected() {
        let dir = scratch("oversized");
        let socket = UnixSocket::new(&dir);
        let (tx, _rx) = crossbeam_channel::unbounded();
        socket.listen_events(tx).unwrap();

        let reply = raw_reply(&socket, &u32::MAX.to_be_bytes());
        assert!(reply.starts_with("ERR frame too large"));
        socket.cleanup();
    }

    #[test]
    fn send_without_daemon_fails() {
        let dir = scratch("nodaemon");
        let socket = UnixSocket::new(&dir);
        assert!(matches!(
            socket.send_event(Command::Refresh),
            Err(ApiError::IoError(_))
        ));
    }

    #[test]
    fn commands_map_to_session_events() {
        assert_eq!(Command::Refresh.into_event(), SessionEvent::RefreshRequested);
        assert_eq!(Command::Deactivate.into_event(), SessionEvent::DeactivateRequested);
        assert_eq!(
            Command::Activate { id: Some("pad-3".into()) }.into_event(),
            SessionEvent::ActivateRequested(Some("pad-3".into()))
        );
    }
}
