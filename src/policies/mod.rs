//! Retry policies.
//!
//! This module groups the knobs that control **how long** the reconnect loop
//! waits between attempts.
//!
//! ## Contents
//! - [`BackoffPolicy`] how retry delays evolve (first / factor / max)
//! - [`BackoffState`]  the attempt counter and current delay owned by the loop
//!
//! ## Quick wiring
//! ```text
//! KeeperConfig { backoff: BackoffPolicy, .. }
//!      └─► core::keeper::Keeper owns BackoffState::new(policy):
//!           - next_delay() once per failure, before arming the retry timer
//!           - reset()      once per confirmed Ready transition
//! ```
//!
//! ## Defaults
//! - `BackoffPolicy::default()` → first=1s, factor=2.0, max=60s, no jitter.

mod backoff;

pub use backoff::{BackoffPolicy, BackoffState};
