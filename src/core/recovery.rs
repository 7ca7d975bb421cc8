//! # Disconnect recovery window.
//!
//! A link that drops to `Disconnected` is given a short window to recover on
//! its own. If it reaches `Signalling`, `Connecting` or `Ready` in time the
//! drop was transient and the same link is kept; otherwise the link is lost.
//!
//! ```text
//! supervise(status, window)
//!   loop {
//!     wait Disconnected | Destroyed
//!       Destroyed ──────────────────────────────► FatalDisconnect
//!       Disconnected:
//!         wait Signalling | Connecting | Ready (≤ window)
//!           ok      ─► TransientDisconnect, keep watching
//!           elapsed ──────────────────────────► FatalDisconnect
//!   }
//! ```

use std::time::Duration;

use tokio::sync::watch;

use crate::error::LinkError;
use crate::events::{Bus, Event, EventKind};
use crate::voice::{LinkStatus, wait_for_any};

/// Statuses that show the transport is re-establishing by itself.
const RECOVERING: [LinkStatus; 3] = [
    LinkStatus::Signalling,
    LinkStatus::Connecting,
    LinkStatus::Ready,
];

/// Loss signal sent from a session's supervisor to the reconnect loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LinkLoss {
    /// Generation of the session that lost its link.
    pub session: u64,
    pub error: LinkError,
}

/// Watches one link until it is lost and returns why.
///
/// Transient disconnects are published on `bus` and otherwise absorbed.
pub(crate) async fn supervise(
    mut status: watch::Receiver<LinkStatus>,
    window: Duration,
    bus: &Bus,
    session: u64,
) -> LinkError {
    loop {
        let dropped = match status
            .wait_for(|s| matches!(s, LinkStatus::Disconnected | LinkStatus::Destroyed))
            .await
        {
            Ok(s) => *s,
            Err(_) => return LinkError::FatalDisconnect,
        };
        if dropped == LinkStatus::Destroyed {
            return LinkError::FatalDisconnect;
        }

        match wait_for_any(&mut status, &RECOVERING, window).await {
            Ok(recovered) => {
                tracing::debug!(session, status = recovered.as_str(), "link recovering on its own");
                bus.publish(Event::new(EventKind::TransientDisconnect).with_session(session));
            }
            Err(error) => {
                tracing::debug!(session, %error, "link did not recover");
                return LinkError::FatalDisconnect;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    fn spawn_supervisor(
        rx: watch::Receiver<LinkStatus>,
        bus: Bus,
    ) -> tokio::task::JoinHandle<(LinkError, Instant)> {
        tokio::spawn(async move {
            let err = supervise(rx, Duration::from_secs(5), &bus, 1).await;
            (err, Instant::now())
        })
    }

    #[tokio::test(start_paused = true)]
    async fn transient_disconnect_is_absorbed() {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let (tx, rx) = watch::channel(LinkStatus::Ready);
        let handle = spawn_supervisor(rx, bus.clone());

        tx.send_replace(LinkStatus::Disconnected);
        tokio::time::sleep(Duration::from_secs(2)).await;
        tx.send_replace(LinkStatus::Signalling);
        tokio::time::sleep(Duration::from_secs(1)).await;
        tx.send_replace(LinkStatus::Ready);

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert!(!handle.is_finished());

        let ev = events.recv().await.unwrap();
        assert_eq!(ev.kind, EventKind::TransientDisconnect);
        assert_eq!(ev.session, Some(1));
        handle.abort();
    }

    /// Disconnect, then `status` 2s later: the supervisor must keep running.
    async fn recovers_through(status: LinkStatus) {
        let bus = Bus::new(16);
        let mut events = bus.subscribe();
        let (tx, rx) = watch::channel(LinkStatus::Ready);
        let handle = spawn_supervisor(rx, bus.clone());

        tx.send_replace(LinkStatus::Disconnected);
        tokio::time::sleep(Duration::from_secs(2)).await;
        tx.send_replace(status);
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!handle.is_finished(), "{status:?} within the window must count as recovery");
        assert_eq!(events.recv().await.unwrap().kind, EventKind::TransientDisconnect);
        assert!(events.try_recv().is_err());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn connecting_within_window_recovers() {
        recovers_through(LinkStatus::Connecting).await;
    }

    #[tokio::test(start_paused = true)]
    async fn ready_within_window_recovers() {
        recovers_through(LinkStatus::Ready).await;
    }

    #[test]
    fn every_recovering_status_is_accepted() {
        for status in [LinkStatus::Signalling, LinkStatus::Connecting, LinkStatus::Ready] {
            assert!(RECOVERING.contains(&status), "{status:?}");
        }
        assert!(!RECOVERING.contains(&LinkStatus::Idle));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_window_is_fatal() {
        let (tx, rx) = watch::channel(LinkStatus::Ready);
        let handle = spawn_supervisor(rx, Bus::new(16));

        tokio::task::yield_now().await;
        let dropped_at = Instant::now();
        tx.send_replace(LinkStatus::Disconnected);

        let (err, at) = handle.await.unwrap();
        assert_eq!(err, LinkError::FatalDisconnect);
        assert_eq!(at - dropped_at, Duration::from_secs(5));
        drop(tx);
    }

    #[tokio::test(start_paused = true)]
    async fn destroyed_is_fatal_at_once() {
        let (tx, rx) = watch::channel(LinkStatus::Ready);
        let handle = spawn_supervisor(rx, Bus::new(16));

        let start = Instant::now();
        tx.send_replace(LinkStatus::Destroyed);
        let (err, at) = handle.await.unwrap();
        assert_eq!(err, LinkError::FatalDisconnect);
        assert_eq!(at, start);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_source_is_fatal() {
        let (tx, rx) = watch::channel(LinkStatus::Ready);
        let handle = spawn_supervisor(rx, Bus::new(16));
        drop(tx);
        let (err, _) = handle.await.unwrap();
        assert_eq!(err, LinkError::FatalDisconnect);
    }
}
