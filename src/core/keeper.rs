//! # Keeper: the reconnect loop.
//!
//! [`Keeper::run`] drives one target channel forever. It is an explicit state
//! machine fed by an event queue; all mutable state (backoff, retry timer,
//! current session) is owned by the loop and touched only from it.
//!
//! ## States
//! ```text
//!                ┌──────────── timer fired ─────────────┐
//!                ▼                                      │
//!  start ─► Attempting ── establish ok ──► Connected    │
//!                │                            │         │
//!                │ establish err              │ link lost / watchdog mismatch
//!                ▼                            ▼         │
//!           request_retry ──────────────► Retrying ─────┘
//! ```
//!
//! ## Inputs while Connected / Retrying
//! ```text
//! select (biased) {
//!   cancelled       ─► exit (no graceful leave)
//!   timer.fired()   ─► Attempting
//!   loss queue      ─► stale id? drop : LinkLost, destroy session, request_retry
//!   watchdog tick   ─► Connected? check membership : ignore
//! }
//! ```
//!
//! ## Rules
//! - At most one live session: entering `Attempting` destroys the previous one
//!   before joining again.
//! - At most one pending retry: a retry request while the timer is armed is
//!   ignored (published as `RetryIgnored`).
//! - Backoff resets only when an attempt reaches `Ready`.
//! - Loss signals carry the session generation id; signals from a replaced
//!   session are dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use super::config::KeeperConfig;
use super::recovery::LinkLoss;
use super::session::{Session, establish};
use super::timer::RetryTimer;
use super::watchdog::{self, Watchdog};
use crate::error::LinkError;
use crate::events::{Bus, Event, EventKind};
use crate::policies::BackoffState;
use crate::voice::{Platform, Target};

/// Reconnect loop state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Joining and waiting for `Ready`.
    Attempting,
    /// Holding a ready session.
    Connected,
    /// Waiting for the retry timer.
    Retrying,
}

impl LoopState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoopState::Attempting => "attempting",
            LoopState::Connected => "connected",
            LoopState::Retrying => "retrying",
        }
    }
}

/// State owned by a running loop.
struct LoopCtx {
    state: LoopState,
    backoff: BackoffState,
    timer: RetryTimer,
    session: Option<Session>,
    next_id: u64,
}

impl LoopCtx {
    fn new(backoff: BackoffState) -> Self {
        Self {
            state: LoopState::Attempting,
            backoff,
            timer: RetryTimer::new(),
            session: None,
            next_id: 0,
        }
    }

    fn enter(&mut self, next: LoopState) {
        if self.state != next {
            tracing::trace!(from = self.state.as_str(), to = next.as_str(), "loop state");
        }
        self.state = next;
    }
}

/// Keeps the account in one voice channel.
pub struct Keeper<P: Platform + ?Sized> {
    platform: Arc<P>,
    target: Target,
    cfg: KeeperConfig,
    bus: Bus,
}

impl<P: Platform + ?Sized> Keeper<P> {
    #[must_use]
    pub fn new(platform: Arc<P>, target: Target, cfg: KeeperConfig, bus: Bus) -> Self {
        Self {
            platform,
            target,
            cfg,
            bus,
        }
    }

    /// Runs until `token` is cancelled. Starts in `Attempting`.
    ///
    /// On exit the current session's background tasks stop; the link itself
    /// is left as is.
    pub async fn run(self, token: CancellationToken) {
        let (loss_tx, mut loss_rx) = mpsc::channel(self.cfg.queue_capacity_clamped());
        let mut ctx = LoopCtx::new(BackoffState::new(self.cfg.backoff));
        let mut dog = Watchdog::new(self.cfg.watchdog_period());

        loop {
            match ctx.state {
                LoopState::Attempting => {
                    if let Some(old) = ctx.session.take() {
                        old.destroy(&self.bus);
                    }
                    ctx.next_id += 1;
                    let id = ctx.next_id;
                    self.bus.publish(
                        Event::new(EventKind::AttemptStarting)
                            .with_session(id)
                            .with_channel(self.target.channel)
                            .with_attempt(ctx.backoff.attempt()),
                    );

                    let res = tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        res = establish(&*self.platform, &self.target, &self.cfg, &self.bus, id, &loss_tx) => res,
                    };
                    match res {
                        Ok(session) => {
                            ctx.backoff.reset();
                            ctx.session = Some(session);
                            ctx.enter(LoopState::Connected);
                            dog.rearm();
                            self.bus.publish(
                                Event::new(EventKind::Connected)
                                    .with_session(id)
                                    .with_channel(self.target.channel),
                            );
                        }
                        Err(error) => {
                            self.bus.publish(
                                Event::new(EventKind::AttemptFailed)
                                    .with_session(id)
                                    .with_reason(error.to_string()),
                            );
                            self.request_retry(&mut ctx, &error);
                        }
                    }
                }
                LoopState::Connected | LoopState::Retrying => {
                    tokio::select! {
                        biased;
                        _ = token.cancelled() => break,
                        _ = ctx.timer.fired() => ctx.enter(LoopState::Attempting),
                        Some(loss) = loss_rx.recv() => self.on_loss(&mut ctx, loss),
                        _ = dog.tick() => self.on_watchdog(&mut ctx),
                    }
                }
            }
        }
        tracing::debug!(state = ctx.state.as_str(), "keeper loop cancelled");
    }

    /// Single retry path shared by every failure cause.
    fn request_retry(&self, ctx: &mut LoopCtx, error: &LinkError) {
        if ctx.timer.is_pending() {
            tracing::debug!(error = error.as_label(), "retry already pending; request ignored");
            self.bus
                .publish(Event::new(EventKind::RetryIgnored).with_reason(error.to_string()));
            return;
        }

        let delay = ctx.backoff.next_delay();
        ctx.timer.arm(delay);
        ctx.enter(LoopState::Retrying);
        self.bus.publish(
            Event::new(EventKind::BackoffScheduled)
                .with_delay(delay)
                .with_attempt(ctx.backoff.attempt())
                .with_reason(error.to_string()),
        );
    }

    fn on_loss(&self, ctx: &mut LoopCtx, loss: LinkLoss) {
        let current = ctx.session.as_ref().map(Session::id);
        if current != Some(loss.session) {
            tracing::debug!(stale = loss.session, ?current, "loss from replaced session dropped");
            return;
        }

        self.bus.publish(
            Event::new(EventKind::LinkLost)
                .with_session(loss.session)
                .with_reason(loss.error.to_string()),
        );
        if let Some(session) = ctx.session.take() {
            session.destroy(&self.bus);
        }
        self.request_retry(ctx, &loss.error);
    }

    fn on_watchdog(&self, ctx: &mut LoopCtx) {
        if ctx.state != LoopState::Connected {
            return;
        }
        if let Err(error) = watchdog::check(&*self.platform, &self.target) {
            tracing::debug!(?error, "watchdog mismatch");
            let mut ev = Event::new(EventKind::LinkLost).with_reason(error.to_string());
            if let Some(id) = ctx.session.as_ref().map(Session::id) {
                ev = ev.with_session(id);
            }
            self.bus.publish(ev);
            self.request_retry(ctx, &error);
        }
    }
}
