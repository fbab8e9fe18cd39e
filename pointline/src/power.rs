//! Power-management seam.
//!
//! Entering deep sleep ends the current execution context on a device: the
//! client flushes pending points first, then hands control to a
//! [`PowerControl`] which does not return until an external wake event.

use std::time::Duration;

/// Suspends the device.
pub trait PowerControl {
    /// Sleeps for `duration`, or until an external wake event.
    fn deep_sleep(&mut self, duration: Duration);
}

/// Host stand-in for deep sleep: parks the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSuspend;

impl PowerControl for ThreadSuspend {
    fn deep_sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
