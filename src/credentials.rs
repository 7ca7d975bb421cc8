//! # Credentials and target from the environment.
//!
//! Reads three keys, after loading a `.env` file from the working directory
//! when one exists (values already in the environment win):
//!
//! | Key          | Meaning                          |
//! |--------------|----------------------------------|
//! | `TOKEN`      | account token passed to login    |
//! | `GUILD_ID`   | guild snowflake                  |
//! | `CHANNEL_ID` | voice channel snowflake          |
//!
//! Missing or blank keys are reported together in one
//! [`RuntimeError::ConfigMissing`]; there is no interactive fallback.

use std::fmt;

use crate::error::RuntimeError;
use crate::voice::{ChannelId, GuildId, Target};

const TOKEN: &str = "TOKEN";
const GUILD_ID: &str = "GUILD_ID";
const CHANNEL_ID: &str = "CHANNEL_ID";

/// Account token. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct Token(String);

impl Token {
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Raw secret, for handing to the platform client.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Token(***)")
    }
}

/// Everything the process needs from its operator.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub token: Token,
    pub target: Target,
}

impl Credentials {
    /// Loads `.env` (if present) and reads the process environment.
    pub fn from_env() -> Result<Self, RuntimeError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::debug!(error = %e, ".env present but unreadable; using process environment");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds credentials from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RuntimeError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let token = read(TOKEN);
        let guild = read(GUILD_ID);
        let channel = read(CHANNEL_ID);

        let (token, guild, channel) = match (token, guild, channel) {
            (Some(t), Some(g), Some(c)) => (t, g, c),
            (t, g, c) => {
                let keys = [(TOKEN, t.is_none()), (GUILD_ID, g.is_none()), (CHANNEL_ID, c.is_none())]
                    .into_iter()
                    .filter_map(|(key, missing)| missing.then_some(key))
                    .collect();
                return Err(RuntimeError::ConfigMissing { keys });
            }
        };

        let guild: GuildId = guild.parse().map_err(|_| RuntimeError::ConfigInvalid {
            key: GUILD_ID,
            value: guild.clone(),
        })?;
        let channel: ChannelId = channel.parse().map_err(|_| RuntimeError::ConfigInvalid {
            key: CHANNEL_ID,
            value: channel.clone(),
        })?;

        Ok(Self {
            token: Token::new(token),
            target: Target::new(guild, channel),
        })
    }
}
