//! # Membership watchdog.
//!
//! Transport status can claim `Ready` while the platform no longer lists the
//! account in the channel (moved by a moderator, kicked, stale gateway state).
//! The watchdog periodically reads actual membership and reports a mismatch.
//!
//! ## Rules
//! - First tick one full period after creation or [`Watchdog::rearm`].
//! - Missed ticks are delayed, not bursted.
//! - [`check`] is a fresh read every time; nothing is cached.

use std::time::Duration;

use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::error::LinkError;
use crate::voice::{Platform, Target};

/// Periodic tick source for membership checks.
#[derive(Debug)]
pub struct Watchdog {
    interval: Interval,
}

impl Watchdog {
    /// Creates a watchdog ticking every `period` (must be non-zero).
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }

    /// Completes on the next tick. Cancel-safe.
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// Restarts the period from now.
    pub fn rearm(&mut self) {
        self.interval.reset();
    }
}

/// Compares the account's actual voice channel in the target guild with the
/// desired one.
pub fn check<P>(platform: &P, target: &Target) -> Result<(), LinkError>
where
    P: Platform + ?Sized,
{
    match platform.voice_channel(target.guild) {
        Some(actual) if actual == target.channel => Ok(()),
        actual => Err(LinkError::WatchdogMismatch { actual }),
    }
}
