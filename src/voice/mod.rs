//! # Voice collaborators.
//!
//! The keeper never talks to the network itself. Everything platform-specific
//! sits behind the traits in this module, implemented by the embedding binary
//! on top of its realtime-voice client library:
//!
//! - [`Platform`]: login, guild cache, fresh membership reads, join, player factory;
//! - [`VoiceLink`]: one transport connection and its [`LinkStatus`] stream;
//! - [`AudioPlayer`]: plays an [`AudioResource`] and reports [`PlayerEvent`]s.
//!
//! The module also owns the data the keeper feeds those traits: the desired
//! [`Target`], the [`Presence`] flags and the keepalive silence source.

mod keepalive;
mod platform;
mod status;
mod target;

#[cfg(test)]
pub(crate) mod fake;

pub use keepalive::{AudioResource, KeepaliveSource, SILENCE_FRAME, StreamType};
pub use platform::{
    Account, AudioPlayer, NoSubscriberBehavior, Platform, PlatformError, PlayerEvent, Presence,
    VoiceLink,
};
pub use status::{LinkStatus, WaitError, wait_for_any};
pub use target::{ChannelId, GuildId, Target};

pub(crate) use keepalive::start as start_keepalive;
