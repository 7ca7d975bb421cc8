//! # Subscriber contract.
//!
//! A subscriber is anything that wants to watch the keeper work: the built-in
//! [`LogWriter`](crate::LogWriter), a metrics counter, an alerting hook.
//!
//! ## Contract
//! - `on_event` runs on the subscriber's own worker task, never on the
//!   reconnect loop. A slow subscriber only delays itself.
//! - [`Subscribe::wants`] filters events before they are queued; unwanted
//!   kinds cost nothing and cannot overflow the queue.
//! - A full queue drops the event for that subscriber and reports
//!   `SubscriberOverflow`; a panic is reported as `SubscriberPanicked`.

use async_trait::async_trait;

use crate::events::{Event, EventKind};

/// Receives keeper events.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Called once per wanted event, in publish order.
    async fn on_event(&self, event: &Event);

    /// Whether events of `kind` should be queued for this subscriber.
    fn wants(&self, _kind: EventKind) -> bool {
        true
    }

    /// Name used in overflow and panic reports.
    fn name(&self) -> &'static str {
        "subscriber"
    }

    /// Queue size. The keeper emits a handful of events per reconnect, so
    /// the default is small.
    fn queue_capacity(&self) -> usize {
        256
    }
}
