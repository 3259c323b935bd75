use std::time::Duration;

use crate::export::run::CancelToken;

/// Delay between consecutive downloads. Browsers throttle bursts of programmatic downloads, so
/// exports are paced one item at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PacingPolicy {
    /// Wait after each item except the last.
    pub delay_per_item: Duration,
}

impl PacingPolicy {
    /// Default delay between downloads.
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(500);

    /// Policy with a custom delay.
    pub fn new(delay_per_item: Duration) -> Self {
        Self { delay_per_item }
    }

    /// Policy that never waits.
    pub fn immediate() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl Default for PacingPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY)
    }
}

/// Performs the pacing wait.
pub trait Pacer {
    /// Wait up to `delay`. Returns `false` if `cancel` fired before the delay elapsed.
    fn wait(&mut self, delay: Duration, cancel: &CancelToken) -> bool;
}

/// Blocks the calling thread; wakes early on cancellation.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadPacer;

impl Pacer for ThreadPacer {
    fn wait(&mut self, delay: Duration, cancel: &CancelToken) -> bool {
        !cancel.wait_timeout(delay)
    }
}

/// Never waits. Records requested delays so tests can assert on pacing without a clock.
#[derive(Debug, Default)]
pub struct NoDelay {
    requested: Vec<Duration>,
}

impl NoDelay {
    /// Create a pacer with no recorded waits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every delay requested so far.
    pub fn requested(&self) -> &[Duration] {
        &self.requested
    }
}

impl Pacer for NoDelay {
    fn wait(&mut self, delay: Duration, cancel: &CancelToken) -> bool {
        self.requested.push(delay);
        !cancel.is_cancelled()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/export/pacing.rs"]
mod tests;
