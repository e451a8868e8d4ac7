//! Blocking pauses between steps of composite actions.

use std::time::Duration;

/// Blocks the calling thread for a duration.
#[cfg_attr(test, mockall::automock)]
pub trait Pause: Send + Sync {
    fn pause(&self, duration: Duration);
}

/// Pauses with `std::thread::sleep`.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadSleep;

impl Pause for ThreadSleep {
    fn pause(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
