use std::time::Duration;

/// Bounded backoff schedule for remote-media subscription.
///
/// The coordinator itself never retries anything; this policy lives
/// entirely on the client side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(500),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Policy that never waits and never retries, for tests and for
    /// transports that handle their own recovery.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Delay before the retry following failed attempt number `attempt`
    /// (1-based).
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.initial_delay * self.multiplier.saturating_pow(attempt.saturating_sub(1))
    }

    /// The full schedule of waits between attempts; its length is
    /// `max_attempts - 1`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        (1..self.max_attempts).map(|attempt| self.delay_after(attempt))
    }
}
