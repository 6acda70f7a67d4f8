use crate::types::Severity;

/// Fire-and-forget sink for operator-visible messages.
pub trait Notifier: Send {
    fn notify(&self, title: &str, text: &str, severity: Severity);
}
