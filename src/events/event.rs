//! # Runtime events emitted by the keeper and its sessions.
//!
//! The [`EventKind`] enum classifies event types across four categories:
//! - **Bootstrap events**: login and shutdown
//! - **Attempt events**: one connection attempt (starting, connected, failed)
//! - **Link events**: what happens to a live link (transient/fatal disconnect, teardown)
//! - **Retry events**: backoff scheduling and ignored re-entrant requests
//!
//! The [`Event`] struct carries additional metadata such as timestamps,
//! channel ids, reasons, and backoff delays.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use voicekeeper::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::BackoffScheduled)
//!     .with_reason("Link lost")
//!     .with_attempt(3)
//!     .with_delay(Duration::from_secs(4));
//!
//! assert_eq!(ev.kind, EventKind::BackoffScheduled);
//! assert_eq!(ev.reason.as_deref(), Some("Link lost"));
//! assert_eq!(ev.delay_ms, Some(4000));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

use crate::voice::ChannelId;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of runtime events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Subscriber events ===
    /// Subscriber panicked during event processing.
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: panic info/message
    SubscriberPanicked,

    /// Subscriber dropped an event (queue full or worker closed).
    ///
    /// Sets:
    /// - `subject`: subscriber name
    /// - `reason`: "full" or "closed"
    SubscriberOverflow,

    // === Bootstrap events ===
    /// Login succeeded; the platform reported ready.
    ///
    /// Sets:
    /// - `subject`: account tag
    LoggedIn,

    /// Shutdown requested (OS signal observed).
    ShutdownRequested,

    // === Attempt events ===
    /// Reconnect loop entered `Attempting`.
    ///
    /// Sets:
    /// - `session`: id of the session being established
    /// - `attempt`: failures since the last ready link
    AttemptStarting,

    /// Link reached Ready; loop entered `Connected`.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `channel`: joined channel
    Connected,

    /// Establishing a link failed.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `reason`: failure message
    AttemptFailed,

    // === Link events ===
    /// Link dropped to Disconnected and recovered on its own within the window.
    ///
    /// Sets:
    /// - `session`: session id (when known)
    TransientDisconnect,

    /// A connected link was declared lost (fatal disconnect or watchdog mismatch).
    ///
    /// Sets:
    /// - `session`: session id
    /// - `reason`: loss message
    LinkLost,

    /// A session handle was torn down.
    ///
    /// Sets:
    /// - `session`: session id
    /// - `reason`: destroy error, if the transport reported one
    SessionDestroyed,

    // === Retry events ===
    /// Retry timer armed.
    ///
    /// Sets:
    /// - `attempt`: failures since the last ready link (including this one)
    /// - `delay_ms`: delay before the next attempt
    /// - `reason`: cause of the retry
    BackoffScheduled,

    /// Retry requested while a timer was already pending; dropped.
    ///
    /// Sets:
    /// - `reason`: cause of the ignored request
    RetryIgnored,
}

/// Runtime event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Session id this event belongs to.
    pub session: Option<u64>,
    /// Voice channel involved.
    pub channel: Option<ChannelId>,
    /// Backoff delay before next attempt in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Failure count at the time of the event.
    pub attempt: Option<u32>,
    /// Human-readable reason (errors, overflow details, etc.).
    pub reason: Option<Arc<str>>,
    /// Named subject: account tag or subscriber name.
    pub subject: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            session: None,
            channel: None,
            delay_ms: None,
            attempt: None,
            reason: None,
            subject: None,
        }
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches a subject (account tag, subscriber name).
    #[inline]
    pub fn with_subject(mut self, subject: impl Into<Arc<str>>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    #[inline]
    pub fn with_session(mut self, id: u64) -> Self {
        self.session = Some(id);
        self
    }

    #[inline]
    pub fn with_channel(mut self, channel: ChannelId) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Attaches a backoff delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    #[inline]
    pub fn with_attempt(mut self, n: u32) -> Self {
        self.attempt = Some(n);
        self
    }

    /// Creates a subscriber overflow event.
    #[inline]
    pub fn subscriber_overflow(subscriber: &'static str, reason: &'static str) -> Self {
        Event::new(EventKind::SubscriberOverflow)
            .with_subject(subscriber)
            .with_reason(reason)
    }

    /// Creates a subscriber panic event.
    #[inline]
    pub fn subscriber_panicked(subscriber: &'static str, info: String) -> Self {
        Event::new(EventKind::SubscriberPanicked)
            .with_subject(subscriber)
            .with_reason(info)
    }

    /// Backoff delay as a [`Duration`], if set.
    pub fn delay(&self) -> Option<Duration> {
        self.delay_ms.map(|ms| Duration::from_millis(u64::from(ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_numbers_increase() {
        let a = Event::new(EventKind::AttemptStarting);
        let b = Event::new(EventKind::Connected);
        assert!(b.seq > a.seq);
    }

    #[test]
    fn delay_saturates_at_u32() {
        let ev = Event::new(EventKind::BackoffScheduled).with_delay(Duration::from_secs(u64::MAX / 4));
        assert_eq!(ev.delay_ms, Some(u32::MAX));
    }
}
