use colored::Colorize;

use padlink_session::{Notifier, Severity};

use crate::{print_error, print_info};

/// Shows session notices in the daemon log.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, title: &str, text: &str, severity: Severity) {
        match severity {
            Severity::Success => {
                print_info!("{}: {text}", title.bright_green());
            }
            Severity::Info => {
                print_info!("{}: {text}", title.bold());
            }
            Severity::Error => {
                print_error!("{title}: {text}");
            }
        }
    }
}
