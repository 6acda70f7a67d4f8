// Timestamped, colorized log lines for the daemon

use fern::Dispatch;

/// Targets that follow `--verbose`; everything else logs errors only.
const OWN_TARGETS: [&str; 3] = ["padlinkd", "padlink_session", "padlink_service"];
const TIME_FORMAT: &str = "%Y.%m.%d %H:%M:%S";

#[inline(always)]
pub(crate) fn format_log(message: &str) -> String {
    let now = chrono::Local::now().format(TIME_FORMAT);
    format!("[{now}] {message}")
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::error!("{}", message.bright_red());
    }
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::info!("{message}");
    }
}

#[macro_export]
macro_rules! print_debug {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::debug!("{}", message.dimmed());
    }
}

#[macro_export]
macro_rules! print_warning {
    ($($arg:tt)*) => {
        let message = $crate::logging::format_log(&format!($($arg)*));
        log::warn!("{}", message.bright_yellow());
    }
}

/// Install the stdout logger for the session daemon.
pub fn setup(verbose: bool, no_color: bool) -> Result<(), log::SetLoggerError> {
    let own_level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    OWN_TARGETS
        .iter()
        .fold(Dispatch::new().level(log::LevelFilter::Error), |dispatch, target| {
            dispatch.level_for(*target, own_level)
        })
        .chain(std::io::stdout())
        .apply()?;

    if no_color {
        colored::control::set_override(false);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_line_carries_timestamp_prefix() {
        let line = format_log("Controller active");
        let (stamp, message) = line.split_once("] ").unwrap();
        assert!(stamp.starts_with('['));
        assert_eq!(stamp.len(), "[2024.01.31 12:00:00".len());
        assert_eq!(message, "Controller active");
    }

    #[test]
    fn own_targets_match_crate_names() {
        assert!(OWN_TARGETS.contains(&env!("CARGO_CRATE_NAME")));
    }
}
