//! Exponential backoff between failed submission rounds.

use std::time::Duration;

/// Default delay after the first failure.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_millis(100);

/// Exponential backoff with a cap.
///
/// The first failure waits `initial`; every further consecutive failure
/// doubles the delay up to `max`. A success resets it.
#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// Create a backoff starting at `initial` and capped at `max`.
    #[must_use]
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self { initial, max: max.max(initial), current: Duration::ZERO }
    }

    /// Backoff capped at `max`, starting at [`DEFAULT_INITIAL_BACKOFF`].
    #[must_use]
    pub fn with_max(max: Duration) -> Self {
        Self::new(DEFAULT_INITIAL_BACKOFF, max)
    }

    /// Record a failure and return how long to wait.
    pub fn next_delay(&mut self) -> Duration {
        self.current = if self.current.is_zero() {
            self.initial
        } else {
            self.current.saturating_mul(2).min(self.max)
        };
        self.current
    }

    /// Record a success.
    pub fn reset(&mut self) {
        self.current = Duration::ZERO;
    }

    /// Delay returned by the last [`Self::next_delay`], zero after a reset.
    #[must_use]
    pub fn current(&self) -> Duration {
        self.current
    }
}
