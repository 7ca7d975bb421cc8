//! # Single-slot retry timer.
//!
//! [`RetryTimer`] holds at most one pending retry. The reconnect loop arms it
//! when an attempt fails or a link is lost and waits on [`RetryTimer::fired`]
//! alongside its other inputs.
//!
//! ## Rules
//! - `arm()` on an already armed timer is refused (returns `false`); the
//!   pending deadline is kept.
//! - `fired()` clears the slot when it completes, so the next `arm()` succeeds.
//! - `fired()` on an empty slot never completes.
//! - `fired()` is cancel-safe: dropping it leaves the deadline untouched.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{Instant, Sleep};

/// Cancellable single pending retry.
#[derive(Debug, Default)]
pub struct RetryTimer {
    pending: Option<Pin<Box<Sleep>>>,
}

impl RetryTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedules a retry `delay` from now.
    ///
    /// Returns `false` and changes nothing when a retry is already pending.
    pub fn arm(&mut self, delay: Duration) -> bool {
        if self.pending.is_some() {
            return false;
        }
        self.pending = Some(Box::pin(tokio::time::sleep(delay)));
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending retry, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|s| s.deadline())
    }

    /// Drops the pending retry without firing it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Completes when the pending retry is due.
    pub async fn fired(&mut self) {
        match self.pending.as_mut() {
            Some(sleep) => {
                sleep.as_mut().await;
                self.pending = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
