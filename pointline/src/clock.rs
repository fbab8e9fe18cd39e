//! Time sources for point timestamps.
//!
//! The device firmware stamps points with its uptime counter. That keeps the
//! write path free of wall-clock dependencies but is not an epoch timestamp, so
//! the clock is an injectable [`Clock`]: [`UptimeClock`] reproduces the device
//! behavior, [`SystemClock`] yields Unix-epoch time.

use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// A source of "now", expressed as time elapsed since the clock's epoch.
pub trait Clock {
    /// Returns the current reading.
    fn now(&self) -> Duration;
}

/// Monotonic time since the clock was created.
#[derive(Debug, Clone, Copy)]
pub struct UptimeClock {
    started: Instant,
}

impl UptimeClock {
    /// Starts counting from now.
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
        }
    }
}

impl Default for UptimeClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for UptimeClock {
    fn now(&self) -> Duration {
        self.started.elapsed()
    }
}

/// Wall-clock time since the Unix epoch.
///
/// A system clock set before 1970 reads as zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
    }
}

/// A clock that always returns the same reading.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixedClock(pub Duration);

impl Clock for FixedClock {
    fn now(&self) -> Duration {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}
