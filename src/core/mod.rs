//! Runtime core: the reconnect loop and everything it drives.
//!
//! Internal modules:
//! - [`keeper`]: the reconnect loop state machine;
//! - [`session`]: one connection attempt and the resulting session;
//! - [`recovery`]: disconnect self-recovery window;
//! - [`watchdog`]: periodic membership check;
//! - [`timer`]: single-slot retry timer;
//! - [`runtime`]: login, event plumbing and interrupt handling;
//! - [`shutdown`]: OS termination signals.

mod config;
mod keeper;
mod recovery;
mod runtime;
mod session;
mod shutdown;
mod timer;
mod watchdog;

pub use config::KeeperConfig;
pub use keeper::{Keeper, LoopState};
pub use runtime::{run_until, run_until_signal};
pub use session::Session;
pub use shutdown::wait_for_shutdown_signal;
pub use timer::RetryTimer;
pub use watchdog::Watchdog;
