//! # Event subscribers for the keeper runtime.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Keeper ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit
//!                                                        │
//!                                              ┌─────────┼─────────┐
//!                                              ▼         ▼         ▼
//!                                          LogWriter   Custom     ...
//! ```
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use voicekeeper::{Subscribe, Event, EventKind};
//! use async_trait::async_trait;
//!
//! struct ReconnectCounter;
//!
//! #[async_trait]
//! impl Subscribe for ReconnectCounter {
//!     async fn on_event(&self, event: &Event) {
//!         if event.kind == EventKind::BackoffScheduled {
//!             // count it
//!         }
//!     }
//!
//!     fn name(&self) -> &'static str {
//!         "reconnect-counter"
//!     }
//! }
//! ```

mod log;
mod set;
mod subscribe;

pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
