//! # Keeper runtime configuration.
//!
//! Provides [`KeeperConfig`], the timing and capacity knobs of the reconnect
//! loop. Credentials and the target channel are separate
//! (see [`Credentials`](crate::Credentials)).

use std::time::Duration;

use crate::policies::BackoffPolicy;

/// Timing and capacity settings for the reconnect loop.
///
/// ## Field semantics
/// - `ready_timeout`: how long one attempt may wait for `Ready`
/// - `recovery_window`: how long a disconnected link gets to start recovering on its own
/// - `watchdog_interval`: period of the membership check (min 1ms)
/// - `backoff`: retry delay policy shared by every failure cause
/// - `bus_capacity`: event bus ring buffer size (min 1)
/// - `queue_capacity`: loop signal queue size (min 1)
#[derive(Clone, Debug)]
pub struct KeeperConfig {
    /// Maximum wait for a joined link to reach `Ready`.
    pub ready_timeout: Duration,

    /// Window in which a disconnected link must reach `Signalling` or
    /// `Connecting` to count as self-recovering.
    pub recovery_window: Duration,

    /// Period between watchdog membership checks.
    pub watchdog_interval: Duration,

    /// Retry delay policy.
    pub backoff: BackoffPolicy,

    /// Capacity of the event bus broadcast channel.
    pub bus_capacity: usize,

    /// Capacity of the queue carrying link-loss signals into the loop.
    pub queue_capacity: usize,
}

impl KeeperConfig {
    /// Watchdog period, never zero (a zero-period interval would panic).
    #[inline]
    pub fn watchdog_period(&self) -> Duration {
        self.watchdog_interval.max(Duration::from_millis(1))
    }

    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    #[inline]
    pub fn queue_capacity_clamped(&self) -> usize {
        self.queue_capacity.max(1)
    }
}

impl Default for KeeperConfig {
    /// Default configuration:
    ///
    /// - `ready_timeout = 90s` (slow networks)
    /// - `recovery_window = 5s`
    /// - `watchdog_interval = 60s`
    /// - `backoff = BackoffPolicy::default()` (1s doubling to 60s)
    /// - `bus_capacity = 1024`
    /// - `queue_capacity = 64`
    fn default() -> Self {
        Self {
            ready_timeout: Duration::from_secs(90),
            recovery_window: Duration::from_secs(5),
            watchdog_interval: Duration::from_secs(60),
            backoff: BackoffPolicy::default(),
            bus_capacity: 1024,
            queue_capacity: 64,
        }
    }
}
