mod api;
mod cli;
mod config;
mod logging;
mod notifier;
mod workspace;

use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

use clap::Parser;
use colored::Colorize;
use crossbeam_channel::{unbounded, Receiver};
use thiserror::Error;

use padlink_service::{HttpControllerService, HttpError, PushListener};
use padlink_session::{SessionController, SessionView};

use crate::api::{ApiError, ApiTransport, UnixSocket};
use crate::cli::{Cli, Command};
use crate::config::ConfigError;
use crate::notifier::LogNotifier;
use crate::workspace::Workspace;

#[derive(Debug, Error)]
enum AppError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("session error: {0}")]
    Session(#[from] padlink_session::Error),
    #[error("service error: {0}")]
    Service(#[from] HttpError),
    #[error("failed to set Ctrl+C handler: {0}")]
    Signal(#[from] ctrlc::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[allow(clippy::print_stderr)]
fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(err) = logging::setup(cli.verbose, cli.no_color) {
        eprintln!("unable to set up logger: {err}");
        return ExitCode::FAILURE;
    }

    let result = Workspace::new(cli.workspace.as_deref())
        .map_err(AppError::from)
        .and_then(|workspace| match cli.command {
            Command::Run => run(&workspace),
            command => send(&workspace, command),
        });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_error!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run(workspace: &Workspace) -> Result<(), AppError> {
    let config = workspace.load_config()?;
    let service = HttpControllerService::new(&config.service)?;
    let mut controller = SessionController::new(
        Arc::new(service),
        Box::new(LogNotifier),
        config.poll_interval,
    )?;

    // Handle Ctrl+C to exit cleanly
    let (stop_tx, stop_rx) = unbounded::<()>();
    ctrlc::set_handler(move || {
        let _ = stop_tx.send(());
    })?;

    let socket = UnixSocket::new(workspace.path());
    socket.listen_events(controller.sender())?;

    let push = match config.push_reconnect {
        Some(delay) => Some(PushListener::start(
            config.service.clone(),
            delay,
            controller.sender(),
        )?),
        None => {
            print_warning!("push notifications disabled, relying on polling");
            None
        }
    };

    let views = controller.subscribe();
    thread::Builder::new()
        .name("padlinkd-status".into())
        .spawn(move || report_status(&views))?;

    print_info!(
        "padlinkd started. Controller service at {}",
        config.service.base_url
    );
    controller.start();
    controller.run(&stop_rx);

    if let Some(push) = push {
        push.stop();
    }
    socket.cleanup();
    print_info!("padlinkd stopped");
    Ok(())
}

fn send(workspace: &Workspace, command: Command) -> Result<(), AppError> {
    let Some(command) = command.into_control() else {
        return Ok(());
    };
    print_debug!("sending {command:?}");
    UnixSocket::new(workspace.path()).send_event(command)?;
    Ok(())
}

/// Log status and controller list changes until the session goes away.
fn report_status(views: &Receiver<SessionView>) {
    let mut last_status = None;
    let mut last_controllers = None;
    while let Ok(view) = views.recv() {
        if last_controllers.as_ref() != Some(&view.controllers) {
            let names: Vec<&str> = view
                .controllers
                .iter()
                .map(|c| c.display_name())
                .collect();
            print_debug!("controllers: [{}]", names.join(", "));
            last_controllers = Some(view.controllers.clone());
        }
        if last_status.as_ref() != Some(&view.status) {
            match view.selected.as_deref() {
                Some(id) => {
                    print_info!("{} ({})", view.status_text(), id.cyan());
                }
                None => {
                    print_info!("{}", view.status_text());
                }
            }
            last_status = Some(view.status.clone());
        }
    }
}
