//! Readiness polling schedule.

use std::time::Duration;

/// Configuration for the readiness poller.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Interval before the first status check.
    pub initial_interval: Duration,
    /// Multiplicative backoff applied after each poll.
    pub backoff_factor: f64,
    /// Upper bound on the poll interval.
    pub max_interval: Duration,
    /// Overall deadline for the file to become active.
    pub deadline: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            initial_interval: Duration::from_secs(5),
            backoff_factor: 1.2,
            max_interval: Duration::from_secs(30),
            deadline: Duration::from_secs(8 * 60),
        }
    }
}

impl PollConfig {
    /// Set the overall deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Set the interval before the first poll.
    pub fn with_initial_interval(mut self, interval: Duration) -> Self {
        self.initial_interval = interval;
        self
    }

    /// Set the interval cap.
    pub fn with_max_interval(mut self, interval: Duration) -> Self {
        self.max_interval = interval;
        self
    }

    /// Next poll interval after `current`.
    pub fn next_interval(&self, current: Duration) -> Duration {
        let scaled = current.mul_f64(self.backoff_factor);
        scaled.min(self.max_interval)
    }
}
