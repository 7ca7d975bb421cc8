//! Runtime events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to runtime events emitted by the keeper loop, connection
//! sessions, the recovery supervisor and subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Keeper`, `session::establish`, `recovery::supervise`,
//!   `SubscriberSet` workers (overflow/panic), `run_until_signal` (login, shutdown).
//! - **Consumers**: the listener spawned by `run_until_signal`, which fans out
//!   to the `SubscriberSet`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
