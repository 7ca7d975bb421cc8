//! # Platform, link and player contracts.
//!
//! These traits are the seam between the keeper and the realtime-voice client
//! library. The keeper only ever:
//! - reads the guild cache and the account's current voice channel;
//! - joins once per attempt and destroys links it owns;
//! - plays the keepalive resource and listens for player idle/error events.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::{broadcast, watch};

use super::keepalive::AudioResource;
use super::status::LinkStatus;
use super::target::{ChannelId, GuildId, Target};
use crate::credentials::Token;

/// Error reported by the platform client or transport.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl PlatformError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}

/// Logged-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Display tag, e.g. `name#0001`.
    pub tag: String,
}

/// Voice-state flags sent with a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Presence {
    pub self_mute: bool,
    pub self_deaf: bool,
}

impl Presence {
    /// Muted, not deafened: present in the channel, never talking.
    pub const KEEPALIVE: Presence = Presence {
        self_mute: true,
        self_deaf: false,
    };
}

/// What a player does when no link is subscribed to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoSubscriberBehavior {
    Pause,
    Play,
    Stop,
}

/// Events reported by an [`AudioPlayer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerEvent {
    /// Current resource ended; nothing is playing.
    Idle,
    /// Playback error (the player usually goes idle afterwards).
    Error(String),
}

/// Chat platform client: session, caches, and voice entry points.
#[async_trait]
pub trait Platform: Send + Sync + 'static {
    /// Authenticates and waits for the client's ready signal.
    async fn login(&self, token: &Token) -> Result<Account, PlatformError>;

    /// Whether the guild is present in the local cache.
    fn has_guild(&self, guild: GuildId) -> bool;

    /// Fresh read of the account's current voice channel in `guild`.
    ///
    /// Must reflect platform-side voice state, not the transport status.
    fn voice_channel(&self, guild: GuildId) -> Option<ChannelId>;

    /// Requests a voice join. Returns as soon as the link object exists;
    /// readiness is observed through [`VoiceLink::status`].
    fn join(&self, target: &Target, presence: Presence)
    -> Result<Arc<dyn VoiceLink>, PlatformError>;

    /// Creates a new audio player.
    fn audio_player(&self, behavior: NoSubscriberBehavior) -> Arc<dyn AudioPlayer>;
}

/// One transport connection to a voice channel.
pub trait VoiceLink: Send + Sync {
    /// Receiver for lifecycle status updates.
    fn status(&self) -> watch::Receiver<LinkStatus>;

    /// Routes the player's output into this link.
    fn subscribe(&self, player: Arc<dyn AudioPlayer>);

    /// Tears the link down. May fail if the link is already gone.
    fn destroy(&self) -> Result<(), PlatformError>;
}

/// Audio player feeding a voice link.
pub trait AudioPlayer: Send + Sync {
    /// Starts playing `resource`, replacing whatever was playing.
    fn play(&self, resource: AudioResource);

    /// Receiver for idle/error events.
    fn events(&self) -> broadcast::Receiver<PlayerEvent>;
}
