use std::time::{Duration, Instant};

use crossbeam_channel::{never, tick, Receiver};

/// Default period between background refreshes.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Periodic refresh timer. At most one tick source is alive at a time.
///
/// When disarmed, [`Poller::ticks`] returns a channel that never fires, so the
/// event loop can always select on it.
pub struct Poller {
    interval: Duration,
    ticker: Option<Receiver<Instant>>,
    idle: Receiver<Instant>,
}

impl Poller {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            ticker: None,
            idle: never(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_armed(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn arm(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        self.ticker = Some(tick(self.interval));
    }

    pub fn disarm(&mut self) {
        // Dropping the receiver stops the tick source; pending ticks go with it.
        self.ticker = None;
    }

    pub fn ticks(&self) -> &Receiver<Instant> {
        self.ticker.as_ref().unwrap_or(&self.idle)
    }
}

impl Default for Poller {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arm_twice_keeps_the_same_timer() {
        let mut poller = Poller::new(Duration::from_millis(5));
        poller.arm();
        let first = poller.ticks().clone();
        poller.arm();
        assert!(poller.is_armed());
        assert!(first.same_channel(poller.ticks()));
    }

    #[test]
    fn disarm_is_idempotent() {
        let mut poller = Poller::new(Duration::from_millis(5));
        poller.disarm();
        assert!(!poller.is_armed());
        poller.arm();
        poller.disarm();
        poller.disarm();
        assert!(!poller.is_armed());
    }

    #[test]
    fn armed_poller_ticks() {
        let mut poller = Poller::new(Duration::from_millis(5));
        poller.arm();
        assert!(poller.ticks().recv_timeout(Duration::from_secs(1)).is_ok());
    }

    #[test]
    fn disarmed_poller_never_ticks() {
        let poller = Poller::new(Duration::from_millis(1));
        assert!(poller
            .ticks()
            .recv_timeout(Duration::from_millis(20))
            .is_err());
    }
}
