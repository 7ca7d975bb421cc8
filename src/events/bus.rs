//! # Event bus.
//!
//! Every component that has something to report (reconnect loop, session
//! supervisors, subscriber workers, the runtime itself) publishes onto one
//! [`Bus`]. The runtime's listener is normally the only receiver and hands
//! events on to the subscribers.
//!
//! ```text
//! Keeper ───────┐
//! supervise ────┼──► Bus ──► listener ──► SubscriberSet ──► LogWriter, ...
//! SubscriberSet ┤    (broadcast, capacity = KeeperConfig::bus_capacity)
//! runtime ──────┘
//! ```
//!
//! ## Rules
//! - `publish` never waits; with no receiver the event is dropped (traced).
//! - A receiver that falls more than `capacity` events behind loses the
//!   oldest ones (`RecvError::Lagged`).

use tokio::sync::broadcast;

use super::event::Event;

/// Cloneable publishing handle.
#[derive(Clone, Debug)]
pub struct Bus {
    sender: broadcast::Sender<Event>,
}

impl Bus {
    /// Bus buffering up to `capacity` events (at least one).
    pub fn new(capacity: usize) -> Self {
        Self {
            sender: broadcast::channel(capacity.max(1)).0,
        }
    }

    pub fn publish(&self, event: Event) {
        if let Err(broadcast::error::SendError(event)) = self.sender.send(event) {
            tracing::trace!(kind = ?event.kind, seq = event.seq, "no bus receiver; event dropped");
        }
    }

    /// New receiver seeing events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Number of live receivers.
    pub fn receivers(&self) -> usize {
        self.sender.receiver_count()
    }
}
