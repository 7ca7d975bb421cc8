//! # Backoff policy for reconnect attempts.
//!
//! [`BackoffPolicy`] controls how retry delays grow after repeated failures.
//! It is parameterized by:
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::first`] the initial delay;
//! - [`BackoffPolicy::max`] the maximum delay cap.
//!
//! The delay for attempt `n` is computed as `first × factor^n`, clamped to `max`.
//! There is no jitter: a single process retries a single link, so there is no
//! herd to spread out.
//!
//! [`BackoffState`] is the mutable half: the attempt counter and the delay the
//! next failure will use. The reconnect loop owns exactly one.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use voicekeeper::{BackoffPolicy, BackoffState};
//!
//! let mut state = BackoffState::new(BackoffPolicy::default());
//!
//! assert_eq!(state.next_delay(), Duration::from_secs(1));
//! assert_eq!(state.next_delay(), Duration::from_secs(2));
//! assert_eq!(state.next_delay(), Duration::from_secs(4));
//!
//! state.reset();
//! assert_eq!(state.current(), Duration::from_secs(1));
//! ```

use std::time::Duration;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub first: Duration,
    /// Maximum delay cap for retries.
    pub max: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `first = 1s`;
    /// - `factor = 2.0` (doubling);
    /// - `max = 60s`.
    fn default() -> Self {
        Self {
            first: Duration::from_millis(1_000),
            max: Duration::from_millis(60_000),
            factor: 2.0,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given attempt number (0-indexed).
    ///
    /// The delay is `first × factor^attempt`, clamped to [`BackoffPolicy::max`].
    /// Non-finite or negative intermediate values also clamp to `max`.
    pub fn next(&self, attempt: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let clamped_exp = attempt.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(clamped_exp);

        if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
            self.max
        } else {
            Duration::from_secs_f64(unclamped_secs)
        }
    }
}

/// Attempt counter and current delay.
///
/// ### Rules
/// - Starts at `(0, first)`.
/// - [`next_delay`](Self::next_delay) returns the current delay, then advances.
/// - [`reset`](Self::reset) returns to `(0, first)` regardless of history.
#[derive(Clone, Debug)]
pub struct BackoffState {
    policy: BackoffPolicy,
    attempt: u32,
}

impl BackoffState {
    /// Creates a fresh state for the given policy.
    pub fn new(policy: BackoffPolicy) -> Self {
        Self { policy, attempt: 0 }
    }

    /// Consumes one failure: returns the delay to wait and advances the state.
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.policy.next(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        delay
    }

    /// Confirmed Ready: back to the initial delay.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }

    /// Number of failures since the last reset.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    /// Delay the next failure will use.
    pub fn current(&self) -> Duration {
        self.policy.next(self.attempt)
    }
}
