use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::api;

#[derive(Debug, Subcommand, PartialEq)]
pub(crate) enum Command {
    /// Run the daemon in the foreground.
    Run,
    /// Ask the daemon to refresh the controller list.
    Refresh,
    /// Activate a controller.
    Activate {
        /// The controller to activate. Defaults to the current selection.
        #[clap(short, long)]
        id: Option<String>,
    },
    /// Release the active controller.
    Deactivate,
    /// Select a controller for the next activation.
    Select {
        /// The controller id
        id: String,
    },
}

impl Command {
    /// Control command for a running daemon, `None` for `run`.
    pub(crate) fn into_control(self) -> Option<api::Command> {
        match self {
            Command::Run => None,
            Command::Refresh => Some(api::Command::Refresh),
            Command::Activate { id } => Some(api::Command::Activate { id }),
            Command::Deactivate => Some(api::Command::Deactivate),
            Command::Select { id } => Some(api::Command::Select { id }),
        }
    }
}

/// Drive a remote game controller session from the command line.
#[derive(Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Turn debugging information on
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The directory containing padlink.yaml and the control socket
    #[arg(short, long, global = true)]
    pub workspace: Option<PathBuf>,

    /// The command to run
    #[clap(subcommand)]
    pub command: Command,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activate_without_id_uses_selection() {
        let cli = Cli::try_parse_from(["padlinkd", "activate"]).unwrap();
        assert_eq!(cli.command, Command::Activate { id: None });
        assert_eq!(
            cli.command.into_control(),
            Some(api::Command::Activate { id: None })
        );
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["padlinkd", "select", "pad-2", "--verbose", "-w", "/tmp/pl"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.workspace, Some(PathBuf::from("/tmp/pl")));
        assert_eq!(
            cli.command.into_control(),
            Some(api::Command::Select { id: "pad-2".into() })
        );
    }

    #[test]
    fn run_is_not_a_control_command() {
        let cli = Cli::try_parse_from(["padlinkd", "run"]).unwrap();
        assert_eq!(cli.command.into_control(), None);
    }

    #[test]
    fn select_requires_id() {
        assert!(Cli::try_parse_from(["padlinkd", "select"]).is_err());
    }
}
