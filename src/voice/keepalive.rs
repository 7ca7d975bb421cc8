//! # Keepalive audio.
//!
//! Platforms evict voice members that never send audio. The keeper answers
//! that with the cheapest possible stream: the 3-byte Opus silence frame,
//! repeated forever.
//!
//! [`start`] attaches the source to a player and keeps it attached:
//! ```text
//! start(player, token)
//!   ├─► events = player.events()      (subscribe before first play)
//!   ├─► player.play(silence)
//!   └─► spawn:
//!         loop {
//!           Idle      ─► player.play(silence)
//!           Error(e)  ─► suppressed (debug log only)
//!           Lagged    ─► player.play(silence)
//!           Closed    ─► exit
//!           cancelled ─► exit
//!         }
//! ```

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::broadcast::error::RecvError;
use tokio_util::sync::CancellationToken;

use super::platform::{AudioPlayer, PlayerEvent};

/// Opus-encoded silence.
pub const SILENCE_FRAME: [u8; 3] = [0xF8, 0xFF, 0xFE];

/// Encoding of the frames in an [`AudioResource`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamType {
    /// Frames are already Opus packets; no transcoding.
    Opus,
    /// Raw PCM that the player must encode.
    Raw,
}

/// A playable stream of encoded frames.
pub struct AudioResource {
    pub stream_type: StreamType,
    frames: Box<dyn Iterator<Item = Bytes> + Send>,
}

impl AudioResource {
    pub fn new(stream_type: StreamType, frames: impl Iterator<Item = Bytes> + Send + 'static) -> Self {
        Self {
            stream_type,
            frames: Box::new(frames),
        }
    }

    /// Fresh, infinite silence resource.
    pub fn silence() -> Self {
        Self::new(StreamType::Opus, KeepaliveSource)
    }
}

impl Iterator for AudioResource {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        self.frames.next()
    }
}

impl fmt::Debug for AudioResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioResource")
            .field("stream_type", &self.stream_type)
            .finish_non_exhaustive()
    }
}

/// Infinite sequence of [`SILENCE_FRAME`]s. Never ends, never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepaliveSource;

impl Iterator for KeepaliveSource {
    type Item = Bytes;

    fn next(&mut self) -> Option<Bytes> {
        Some(Bytes::from_static(&SILENCE_FRAME))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

/// Starts silence on `player` now and restarts it whenever the player idles.
///
/// The background task stops when `token` is cancelled or the player's event
/// channel closes.
pub(crate) fn start(player: Arc<dyn AudioPlayer>, token: CancellationToken) {
    let mut events = player.events();
    player.play(AudioResource::silence());

    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                ev = events.recv() => match ev {
                    Ok(PlayerEvent::Idle) => player.play(AudioResource::silence()),
                    Ok(PlayerEvent::Error(error)) => {
                        tracing::debug!(%error, "audio player error suppressed");
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::trace!(skipped, "player events lagged; restarting silence");
                        player.play(AudioResource::silence());
                    }
                    Err(RecvError::Closed) => break,
                },
            }
        }
    });
}
