//! Runs the keeper against a simulated voice platform.
//!
//! ```text
//! TOKEN=demo GUILD_ID=1 CHANNEL_ID=2 cargo run --example keeper
//! ```
//!
//! - `TOKEN=bad` is rejected at login (`Auth failed`, exit 1).
//! - A missing key prints `FATAL: Missing ENV vars: ...` (exit 1).
//! - Ctrl-C exits 0.
//!
//! The simulated link becomes ready after 2s and drops every 20s. Odd drops
//! recover on their own (`LINK: transient disconnect recovered`); even drops
//! stay silent, so the keeper tears the link down and rejoins
//! (`WARN: Link lost. Retry 1s`).

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use voicekeeper::{
    Account, AudioPlayer, AudioResource, ChannelId, Credentials, GuildId, KeeperConfig,
    LinkStatus, LogWriter, NoSubscriberBehavior, Platform, PlatformError, PlayerEvent, Presence,
    RuntimeError, Subscribe, Target, Token, VoiceLink,
};

const READY_AFTER: Duration = Duration::from_secs(2);
const DROP_EVERY: Duration = Duration::from_secs(20);

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{}", e.as_message());
            e.exit_code()
        }
    };
    std::process::exit(code);
}

async fn run() -> Result<(), RuntimeError> {
    let credentials = Credentials::from_env()?;
    let platform = Arc::new(SimPlatform::new(credentials.target));
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];

    voicekeeper::run_until_signal(platform, credentials, KeeperConfig::default(), subs).await
}

struct SimPlatform {
    target: Target,
    membership: Arc<watch::Sender<Option<ChannelId>>>,
    drops: Arc<AtomicU32>,
}

impl SimPlatform {
    fn new(target: Target) -> Self {
        Self {
            target,
            membership: Arc::new(watch::channel(None).0),
            drops: Arc::new(AtomicU32::new(0)),
        }
    }
}

#[async_trait]
impl Platform for SimPlatform {
    async fn login(&self, token: &Token) -> Result<Account, PlatformError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        if token.expose() == "bad" {
            return Err(PlatformError::new("401 Unauthorized"));
        }
        Ok(Account {
            tag: "keeper#0001".into(),
        })
    }

    fn has_guild(&self, guild: GuildId) -> bool {
        guild == self.target.guild
    }

    fn voice_channel(&self, guild: GuildId) -> Option<ChannelId> {
        if guild != self.target.guild {
            return None;
        }
        *self.membership.borrow()
    }

    fn join(&self, target: &Target, presence: Presence) -> Result<Arc<dyn VoiceLink>, PlatformError> {
        println!("(sim) join {} mute={} deaf={}", target.channel, presence.self_mute, presence.self_deaf);
        let link = Arc::new(SimLink {
            status: watch::channel(LinkStatus::Signalling).0,
            membership: Arc::clone(&self.membership),
        });

        let driven = Arc::clone(&link);
        let channel = target.channel;
        let drops = Arc::clone(&self.drops);
        tokio::spawn(async move {
            driven.status.send_replace(LinkStatus::Connecting);
            tokio::time::sleep(READY_AFTER).await;
            driven.status.send_replace(LinkStatus::Ready);
            driven.membership.send_replace(Some(channel));

            loop {
                tokio::time::sleep(DROP_EVERY).await;
                if *driven.status.borrow() == LinkStatus::Destroyed {
                    break;
                }
                driven.status.send_replace(LinkStatus::Disconnected);
                if drops.fetch_add(1, Ordering::Relaxed) % 2 == 1 {
                    break;
                }
                tokio::time::sleep(Duration::from_secs(1)).await;
                driven.status.send_replace(LinkStatus::Signalling);
                driven.status.send_replace(LinkStatus::Ready);
            }
        });
        Ok(link)
    }

    fn audio_player(&self, _behavior: NoSubscriberBehavior) -> Arc<dyn AudioPlayer> {
        Arc::new(SimPlayer {
            events: broadcast::channel(8).0,
        })
    }
}

struct SimLink {
    status: watch::Sender<LinkStatus>,
    membership: Arc<watch::Sender<Option<ChannelId>>>,
}

impl VoiceLink for SimLink {
    fn status(&self) -> watch::Receiver<LinkStatus> {
        self.status.subscribe()
    }

    fn subscribe(&self, _player: Arc<dyn AudioPlayer>) {}

    fn destroy(&self) -> Result<(), PlatformError> {
        self.membership.send_replace(None);
        if self.status.send_replace(LinkStatus::Destroyed) == LinkStatus::Destroyed {
            return Err(PlatformError::new("already destroyed"));
        }
        Ok(())
    }
}

struct SimPlayer {
    events: broadcast::Sender<PlayerEvent>,
}

impl AudioPlayer for SimPlayer {
    fn play(&self, mut resource: AudioResource) {
        // A real player streams forever; pulling one frame is enough here.
        let _ = resource.next();
    }

    fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }
}
