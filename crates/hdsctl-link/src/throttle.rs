//! Minimum spacing between physical transfers.

use std::thread;
use std::time::{Duration, Instant};

/// Enforces a minimum interval between the end of one transfer and the start
/// of the next.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    last_transfer: Instant,
}

impl Throttle {
    /// Create a throttle. The first transfer is spaced from construction time.
    pub fn new(min_interval: Duration) -> Self {
        Throttle {
            min_interval,
            last_transfer: Instant::now(),
        }
    }

    /// Block until the minimum interval has elapsed since the last transfer.
    /// Returns how long the call slept.
    pub fn wait(&self) -> Duration {
        let ready = self.last_transfer + self.min_interval;
        let now = Instant::now();
        if ready <= now {
            return Duration::ZERO;
        }
        let delay = ready - now;
        thread::sleep(delay);
        delay
    }

    /// Record the end of a transfer.
    pub fn mark(&mut self) {
        self.last_transfer = Instant::now();
    }

    /// The configured interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
