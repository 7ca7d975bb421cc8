//! Scripted in-memory platform for tests.
//!
//! Each `join` pops a [`JoinScript`] (default: ready immediately). Links go
//! `Signalling → Connecting` on creation and `Ready` when the script says so;
//! reaching `Ready` updates the platform-side membership the watchdog reads.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::{broadcast, watch};

use super::{
    Account, AudioPlayer, AudioResource, ChannelId, GuildId, LinkStatus, NoSubscriberBehavior,
    Platform, PlatformError, PlayerEvent, Presence, Target, VoiceLink,
};
use crate::credentials::Token;

/// How the next joined link behaves.
#[derive(Debug, Clone)]
pub(crate) enum JoinScript {
    ReadyAfter(Duration),
    Never,
    Fail(&'static str),
}

pub(crate) struct FakePlatform {
    target: Target,
    login: Mutex<Result<Account, PlatformError>>,
    guilds: Mutex<HashSet<GuildId>>,
    membership: Arc<Mutex<Option<ChannelId>>>,
    script: Mutex<VecDeque<JoinScript>>,
    links: Mutex<Vec<Arc<FakeLink>>>,
    players: Mutex<Vec<Arc<FakePlayer>>>,
    presences: Mutex<Vec<Presence>>,
    membership_reads: AtomicUsize,
    max_live: AtomicUsize,
}

impl FakePlatform {
    pub(crate) fn new(target: Target) -> Arc<Self> {
        Arc::new(Self {
            target,
            login: Mutex::new(Ok(Account {
                tag: "keeper#0001".into(),
            })),
            guilds: Mutex::new(HashSet::from([target.guild])),
            membership: Arc::new(Mutex::new(None)),
            script: Mutex::new(VecDeque::new()),
            links: Mutex::new(Vec::new()),
            players: Mutex::new(Vec::new()),
            presences: Mutex::new(Vec::new()),
            membership_reads: AtomicUsize::new(0),
            max_live: AtomicUsize::new(0),
        })
    }

    pub(crate) fn script(&self, steps: impl IntoIterator<Item = JoinScript>) {
        self.script.lock().unwrap().extend(steps);
    }

    pub(crate) fn reject_login(&self, reason: &str) {
        *self.login.lock().unwrap() = Err(PlatformError::new(reason));
    }

    pub(crate) fn forget_guild(&self) {
        self.guilds.lock().unwrap().clear();
    }

    pub(crate) fn set_membership(&self, channel: Option<ChannelId>) {
        *self.membership.lock().unwrap() = channel;
    }

    pub(crate) fn joins(&self) -> usize {
        self.links.lock().unwrap().len()
    }

    pub(crate) fn link(&self, i: usize) -> Arc<FakeLink> {
        Arc::clone(&self.links.lock().unwrap()[i])
    }

    pub(crate) fn last_link(&self) -> Arc<FakeLink> {
        let links = self.links.lock().unwrap();
        Arc::clone(links.last().expect("no link joined"))
    }

    pub(crate) fn player(&self, i: usize) -> Arc<FakePlayer> {
        Arc::clone(&self.players.lock().unwrap()[i])
    }

    pub(crate) fn presences(&self) -> Vec<Presence> {
        self.presences.lock().unwrap().clone()
    }

    pub(crate) fn destroyed(&self) -> usize {
        let links = self.links.lock().unwrap();
        links.iter().filter(|l| l.is_destroyed()).count()
    }

    pub(crate) fn max_live(&self) -> usize {
        self.max_live.load(Ordering::SeqCst)
    }

    pub(crate) fn membership_reads(&self) -> usize {
        self.membership_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Platform for FakePlatform {
    async fn login(&self, _token: &Token) -> Result<Account, PlatformError> {
        self.login.lock().unwrap().clone()
    }

    fn has_guild(&self, guild: GuildId) -> bool {
        self.guilds.lock().unwrap().contains(&guild)
    }

    fn voice_channel(&self, guild: GuildId) -> Option<ChannelId> {
        self.membership_reads.fetch_add(1, Ordering::SeqCst);
        if guild != self.target.guild {
            return None;
        }
        *self.membership.lock().unwrap()
    }

    fn join(
        &self,
        target: &Target,
        presence: Presence,
    ) -> Result<Arc<dyn VoiceLink>, PlatformError> {
        let step = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(JoinScript::ReadyAfter(Duration::ZERO));
        if let JoinScript::Fail(reason) = step {
            return Err(PlatformError::new(reason));
        }

        let link = Arc::new(FakeLink::new(target.channel, Arc::clone(&self.membership)));
        {
            let mut links = self.links.lock().unwrap();
            links.push(Arc::clone(&link));
            let live = links.iter().filter(|l| !l.is_destroyed()).count();
            self.max_live.fetch_max(live, Ordering::SeqCst);
        }
        self.presences.lock().unwrap().push(presence);

        link.set(LinkStatus::Signalling);
        link.set(LinkStatus::Connecting);
        if let JoinScript::ReadyAfter(delay) = step {
            let link = Arc::clone(&link);
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                if !link.is_destroyed() {
                    link.set(LinkStatus::Ready);
                }
            });
        }
        Ok(link)
    }

    fn audio_player(&self, _behavior: NoSubscriberBehavior) -> Arc<dyn AudioPlayer> {
        let player = Arc::new(FakePlayer::new());
        self.players.lock().unwrap().push(Arc::clone(&player));
        player
    }
}

pub(crate) struct FakeLink {
    channel: ChannelId,
    membership: Arc<Mutex<Option<ChannelId>>>,
    tx: watch::Sender<LinkStatus>,
    destroyed: AtomicBool,
    fail_destroy: AtomicBool,
    subscribed: AtomicBool,
}

impl FakeLink {
    fn new(channel: ChannelId, membership: Arc<Mutex<Option<ChannelId>>>) -> Self {
        let (tx, _rx) = watch::channel(LinkStatus::Idle);
        Self {
            channel,
            membership,
            tx,
            destroyed: AtomicBool::new(false),
            fail_destroy: AtomicBool::new(false),
            subscribed: AtomicBool::new(false),
        }
    }

    pub(crate) fn set(&self, status: LinkStatus) {
        match status {
            LinkStatus::Ready => *self.membership.lock().unwrap() = Some(self.channel),
            LinkStatus::Destroyed => *self.membership.lock().unwrap() = None,
            _ => {}
        }
        self.tx.send_replace(status);
    }

    pub(crate) fn current(&self) -> LinkStatus {
        *self.tx.borrow()
    }

    pub(crate) fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub(crate) fn is_subscribed(&self) -> bool {
        self.subscribed.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_destroy(&self) {
        self.fail_destroy.store(true, Ordering::SeqCst);
    }
}

impl VoiceLink for FakeLink {
    fn status(&self) -> watch::Receiver<LinkStatus> {
        self.tx.subscribe()
    }

    fn subscribe(&self, _player: Arc<dyn AudioPlayer>) {
        self.subscribed.store(true, Ordering::SeqCst);
    }

    fn destroy(&self) -> Result<(), PlatformError> {
        self.destroyed.store(true, Ordering::SeqCst);
        self.set(LinkStatus::Destroyed);
        if self.fail_destroy.load(Ordering::SeqCst) {
            return Err(PlatformError::new("already destroyed"));
        }
        Ok(())
    }
}

pub(crate) struct FakePlayer {
    tx: broadcast::Sender<PlayerEvent>,
    plays: AtomicUsize,
    last_frame: Mutex<Option<Bytes>>,
}

impl FakePlayer {
    fn new() -> Self {
        let (tx, _rx) = broadcast::channel(16);
        Self {
            tx,
            plays: AtomicUsize::new(0),
            last_frame: Mutex::new(None),
        }
    }

    pub(crate) fn emit(&self, ev: PlayerEvent) {
        let _ = self.tx.send(ev);
    }

    pub(crate) fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub(crate) fn last_frame(&self) -> Option<Bytes> {
        self.last_frame.lock().unwrap().clone()
    }
}

impl AudioPlayer for FakePlayer {
    fn play(&self, mut resource: AudioResource) {
        *self.last_frame.lock().unwrap() = resource.next();
        self.plays.fetch_add(1, Ordering::SeqCst);
    }

    fn events(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }
}
