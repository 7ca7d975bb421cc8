//! Error types used by the keeper runtime and its connection attempts.
//!
//! This module defines two main error enums:
//!
//! - [`RuntimeError`]: fatal errors that stop the process (bad credentials, missing config).
//! - [`LinkError`]: recoverable failures of one voice link; all of them feed the retry path.
//!
//! Both types provide helper methods (`as_label`, `as_message`) for logging.

use std::time::Duration;
use thiserror::Error;

use crate::voice::ChannelId;

/// # Fatal errors produced by the keeper runtime.
///
/// Anything in this enum terminates the process with a non-zero exit code
/// (see [`RuntimeError::exit_code`]).
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Platform rejected the credentials.
    #[error("auth failed: {reason}")]
    AuthFailure {
        /// Message reported by the platform client.
        reason: String,
    },

    /// Required configuration keys are absent.
    #[error("missing configuration: {keys:?}")]
    ConfigMissing {
        /// Names of the absent keys.
        keys: Vec<&'static str>,
    },

    /// A configuration value is present but unusable.
    #[error("invalid configuration {key}={value:?}")]
    ConfigInvalid {
        /// Name of the offending key.
        key: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },

    /// OS signal listeners could not be registered.
    #[error("signal handler registration failed: {0}")]
    Signal(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use voicekeeper::RuntimeError;
    ///
    /// let err = RuntimeError::ConfigMissing { keys: vec!["TOKEN"] };
    /// assert_eq!(err.as_label(), "runtime_config_missing");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::AuthFailure { .. } => "runtime_auth_failure",
            RuntimeError::ConfigMissing { .. } => "runtime_config_missing",
            RuntimeError::ConfigInvalid { .. } => "runtime_config_invalid",
            RuntimeError::Signal(_) => "runtime_signal",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            RuntimeError::AuthFailure { .. } => "Auth failed".to_string(),
            RuntimeError::ConfigMissing { keys } => {
                format!("FATAL: Missing ENV vars: {}", keys.join(", "))
            }
            RuntimeError::ConfigInvalid { key, value } => {
                format!("FATAL: {key} is not a valid id: {value:?}")
            }
            RuntimeError::Signal(e) => format!("FATAL: signal setup: {e}"),
        }
    }

    /// Process exit code for this error. Every runtime error is fatal.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// # Failures of a single voice link.
///
/// None of these are fatal: the reconnect loop treats every variant the same
/// way and schedules the next attempt using the shared backoff state.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    /// Target guild is not in the platform's cache.
    #[error("Guild miss")]
    TargetUnavailable,

    /// Transport refused the join request synchronously.
    #[error("{reason}")]
    Join {
        /// Message reported by the transport.
        reason: String,
    },

    /// Link did not become ready in time.
    #[error("Ready not reached within {timeout:?}")]
    ConnectTimeout {
        /// The timeout that was exceeded.
        timeout: Duration,
    },

    /// Disconnected and the transport did not start recovering within the window.
    #[error("Link lost")]
    FatalDisconnect,

    /// Actual voice channel differs from the desired one.
    #[error("Watchdog")]
    WatchdogMismatch {
        /// Channel the account is actually in (`None` = not in voice).
        actual: Option<ChannelId>,
    },
}

impl LinkError {
    /// Returns a short stable label (snake_case) for use in logs.
    ///
    /// # Example
    /// ```
    /// use voicekeeper::LinkError;
    ///
    /// assert_eq!(LinkError::FatalDisconnect.as_label(), "link_fatal_disconnect");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            LinkError::TargetUnavailable => "link_target_unavailable",
            LinkError::Join { .. } => "link_join_failed",
            LinkError::ConnectTimeout { .. } => "link_connect_timeout",
            LinkError::FatalDisconnect => "link_fatal_disconnect",
            LinkError::WatchdogMismatch { .. } => "link_watchdog_mismatch",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            LinkError::WatchdogMismatch { actual: Some(ch) } => {
                format!("watchdog: in channel {ch}")
            }
            LinkError::WatchdogMismatch { actual: None } => {
                "watchdog: not in a voice channel".to_string()
            }
            other => other.to_string(),
        }
    }
}
