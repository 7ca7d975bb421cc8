//! # One voice session: a joined link plus its keepalive player.
//!
//! [`establish`] performs a single connection attempt:
//!
//! ```text
//! establish(platform, target)
//!   ├─► has_guild?            no ─► TargetUnavailable
//!   ├─► join(target, mute)    err ─► Join
//!   ├─► player(Play) + subscribe + keepalive silence
//!   ├─► select {
//!   │     Ready within ready_timeout  ─► ok
//!   │     timeout                     ─► ConnectTimeout
//!   │     lost before Ready           ─► FatalDisconnect
//!   │   }
//!   └─► spawn supervisor: loss ─► LinkLoss{session, error} ─► loop queue
//! ```
//!
//! ## Rules
//! - Exactly one `join` per call; failures destroy the partial link before
//!   returning.
//! - Every session carries a generation id; the supervisor tags its loss
//!   signal with it so the loop can drop signals from replaced sessions.
//! - Dropping a [`Session`] stops its background tasks but does not destroy
//!   the link; call [`Session::destroy`] for that.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::config::KeeperConfig;
use super::recovery::{self, LinkLoss};
use crate::error::LinkError;
use crate::events::{Bus, Event, EventKind};
use crate::voice::{
    AudioPlayer, LinkStatus, NoSubscriberBehavior, Platform, Presence, Target, VoiceLink,
    WaitError, start_keepalive, wait_for_any,
};

/// A live (or formerly live) link owned by the reconnect loop.
pub struct Session {
    id: u64,
    link: Arc<dyn VoiceLink>,
    player: Arc<dyn AudioPlayer>,
    token: CancellationToken,
}

impl Session {
    /// Generation id of this session.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn link(&self) -> &Arc<dyn VoiceLink> {
        &self.link
    }

    pub fn player(&self) -> &Arc<dyn AudioPlayer> {
        &self.player
    }

    /// Stops keepalive and supervision, then destroys the link.
    ///
    /// Best-effort: a destroy error (e.g. the link was already gone) is
    /// logged and reported on the `SessionDestroyed` event, never returned.
    pub fn destroy(&self, bus: &Bus) {
        self.token.cancel();
        let ev = Event::new(EventKind::SessionDestroyed).with_session(self.id);
        match self.link.destroy() {
            Ok(()) => bus.publish(ev),
            Err(error) => {
                tracing::debug!(session = self.id, %error, "destroy failed; ignoring");
                bus.publish(ev.with_reason(error.to_string()));
            }
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Performs one connection attempt for `target`.
///
/// On success the returned session is `Ready`, is playing silence and has a
/// supervisor that reports a later loss through `losses`.
pub(crate) async fn establish<P>(
    platform: &P,
    target: &Target,
    cfg: &KeeperConfig,
    bus: &Bus,
    id: u64,
    losses: &mpsc::Sender<LinkLoss>,
) -> Result<Session, LinkError>
where
    P: Platform + ?Sized,
{
    if !platform.has_guild(target.guild) {
        return Err(LinkError::TargetUnavailable);
    }

    let link = platform
        .join(target, Presence::KEEPALIVE)
        .map_err(|e| LinkError::Join { reason: e.0 })?;

    let player = platform.audio_player(NoSubscriberBehavior::Play);
    link.subscribe(Arc::clone(&player));

    let session = Session {
        id,
        link,
        player,
        token: CancellationToken::new(),
    };
    start_keepalive(Arc::clone(&session.player), session.token.child_token());

    let mut ready = session.link.status();
    let outcome = tokio::select! {
        res = wait_for_any(&mut ready, &[LinkStatus::Ready], cfg.ready_timeout) => match res {
            Ok(_) => Ok(()),
            Err(WaitError::Elapsed(timeout)) => Err(LinkError::ConnectTimeout { timeout }),
            Err(WaitError::Closed) => Err(LinkError::FatalDisconnect),
        },
        err = recovery::supervise(session.link.status(), cfg.recovery_window, bus, id) => Err(err),
    };

    if let Err(error) = outcome {
        session.destroy(bus);
        return Err(error);
    }

    let status = session.link.status();
    let token = session.token.clone();
    let window = cfg.recovery_window;
    let bus = bus.clone();
    let losses = losses.clone();
    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            error = recovery::supervise(status, window, &bus, id) => {
                let _ = losses.send(LinkLoss { session: id, error }).await;
            }
        }
    });

    Ok(session)
}
