//! # Link lifecycle status and status waits.
//!
//! A [`VoiceLink`](super::VoiceLink) publishes its [`LinkStatus`] through a
//! `tokio::sync::watch` channel. [`wait_for_any`] is the one waiting primitive
//! the keeper needs: *first of N statuses, else timeout*.
//!
//! ```text
//! Idle ─► Signalling ─► Connecting ─► Ready
//!              ▲             ▲          │
//!              └─────────────┴── Disconnected ◄─┘
//!                                     │
//!                                     ▼
//!                                 Destroyed
//! ```
//!
//! ## Rules
//! - The current value is checked first: a link already in a wanted status
//!   resolves immediately.
//! - Intermediate values may be coalesced by `watch`; callers that care about
//!   "passed through X" should also accept the statuses that follow X.

use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;

/// Transport lifecycle status, mirrored from the voice client library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkStatus {
    Idle,
    Signalling,
    Connecting,
    Ready,
    Disconnected,
    Destroyed,
}

impl LinkStatus {
    /// Lowercase name for logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Idle => "idle",
            LinkStatus::Signalling => "signalling",
            LinkStatus::Connecting => "connecting",
            LinkStatus::Ready => "ready",
            LinkStatus::Disconnected => "disconnected",
            LinkStatus::Destroyed => "destroyed",
        }
    }
}

/// Why a status wait gave up.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitError {
    #[error("no wanted status within {0:?}")]
    Elapsed(Duration),
    #[error("status source closed")]
    Closed,
}

/// Waits until the link enters any of `wanted`, bounded by `timeout`.
///
/// Returns the status that matched.
pub async fn wait_for_any(
    rx: &mut watch::Receiver<LinkStatus>,
    wanted: &[LinkStatus],
    timeout: Duration,
) -> Result<LinkStatus, WaitError> {
    let waiting = rx.wait_for(|s| wanted.contains(s));
    match tokio::time::timeout(timeout, waiting).await {
        Ok(Ok(status)) => Ok(*status),
        Ok(Err(_)) => Err(WaitError::Closed),
        Err(_elapsed) => Err(WaitError::Elapsed(timeout)),
    }
}
