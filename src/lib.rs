//! # voicekeeper
//!
//! **voicekeeper** keeps one account present in one voice channel, forever.
//!
//! It joins the channel muted, plays an endless stream of Opus silence so the
//! platform never evicts it as idle, and heals the link when it breaks:
//! transient drops are given a short window to recover on their own, lost
//! links are torn down and rejoined with exponential backoff, and a periodic
//! watchdog catches the cases where the transport still claims to be
//! connected but the platform says otherwise.
//!
//! The crate does not talk to the network. The embedding binary implements
//! [`Platform`], [`VoiceLink`] and [`AudioPlayer`] on top of its voice client.
//!
//! ## Architecture
//! ```text
//!   Credentials::from_env()          (TOKEN, GUILD_ID, CHANNEL_ID, .env)
//!            │
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  run_until_signal                                                 │
//! │  - login ─► LoggedIn                                              │
//! │  - Bus (broadcast events) ─► listener ─► SubscriberSet            │
//! │  - SIGINT/SIGTERM ─► ShutdownRequested, exit 0                    │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Keeper::run  (Attempting ─► Connected ─► Retrying ─► …)          │
//! │  - BackoffState    1s, 2s, 4s … 60s; reset on Ready               │
//! │  - RetryTimer      at most one pending retry                      │
//! │  - Watchdog        membership check every 60s                     │
//! │  - loss queue  ◄── Session supervisors (generation-tagged)        │
//! └──────┬────────────────────────────────────────────────────────────┘
//!        ▼
//! ┌──────────────────────────────┐   ┌────────────────────────────────┐
//! │  Session                     │   │  recovery::supervise           │
//! │  - VoiceLink (join, muted)   │──►│  Disconnected ─► 5s window     │
//! │  - AudioPlayer + silence     │   │  Signalling/Connecting: keep   │
//! │  - CancellationToken         │   │  silence / Destroyed: lost     │
//! └──────────────────────────────┘   └────────────────────────────────┘
//!
//! Bus ─► SubscriberSet ─► LogWriter ─► "[2026-10-17T09:12:05.502Z] CONNECTED: 222"
//! ```
//!
//! ## Features
//! | Area              | Description                                              | Key types / traits                           |
//! |-------------------|----------------------------------------------------------|----------------------------------------------|
//! | **Runtime**       | Login, reconnect loop, interrupt handling.               | [`run_until_signal`], [`Keeper`]             |
//! | **Collaborators** | Platform seam implemented by the embedding binary.       | [`Platform`], [`VoiceLink`], [`AudioPlayer`] |
//! | **Policies**      | Exponential retry delays.                                | [`BackoffPolicy`], [`BackoffState`]          |
//! | **Subscriber API**| Hook into lifecycle events; built-in log lines.          | [`Subscribe`], [`LogWriter`]                 |
//! | **Errors**        | Fatal vs. per-link failures.                             | [`RuntimeError`], [`LinkError`]              |
//! | **Configuration** | Timings, credentials from the environment.               | [`KeeperConfig`], [`Credentials`]            |

mod core;
mod credentials;
mod error;
mod events;
mod policies;
mod subscribers;
mod voice;

// ---- Public re-exports ----

pub use core::{
    Keeper, KeeperConfig, LoopState, RetryTimer, Session, Watchdog, run_until, run_until_signal,
    wait_for_shutdown_signal,
};
pub use credentials::{Credentials, Token};
pub use error::{LinkError, RuntimeError};
pub use events::{Bus, Event, EventKind};
pub use policies::{BackoffPolicy, BackoffState};
pub use subscribers::{LogWriter, Subscribe, SubscriberSet};
pub use voice::{
    Account, AudioPlayer, AudioResource, ChannelId, GuildId, KeepaliveSource, LinkStatus,
    NoSubscriberBehavior, Platform, PlatformError, PlayerEvent, Presence, SILENCE_FRAME,
    StreamType, Target, VoiceLink, WaitError, wait_for_any,
};
