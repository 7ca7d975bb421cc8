//! # Process runtime: login, event plumbing, reconnect loop, interrupt.
//!
//! ```text
//! run_until_signal(platform, credentials, cfg, subscribers)
//!   ├─► Bus + SubscriberSet + listener (bus ─► set.emit)
//!   ├─► select {
//!   │     shutdown signal ─► ShutdownRequested, cancel ─► Ok(())
//!   │     serve:
//!   │       login         err ─► AuthFailure
//!   │       LoggedIn{tag}
//!   │       Keeper::run(child token)   (never returns on its own)
//!   │   }
//!   └─► drain listener, close subscriber queues, await workers
//! ```
//!
//! Subscribers see every event published before the function returns,
//! including `ShutdownRequested`.

use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::config::KeeperConfig;
use super::keeper::Keeper;
use super::shutdown::wait_for_shutdown_signal;
use crate::credentials::Credentials;
use crate::error::RuntimeError;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::voice::Platform;

/// Logs in and keeps the account in the target channel until SIGINT/SIGTERM.
///
/// Returns `Ok(())` on interrupt (exit code 0). Errors are fatal; map them with
/// [`RuntimeError::exit_code`].
///
/// # Example
/// ```no_run
/// # use std::sync::Arc;
/// # use voicekeeper::{Credentials, KeeperConfig, LogWriter, Platform, Subscribe};
/// # async fn demo(platform: Arc<dyn Platform>) {
/// let credentials = match Credentials::from_env() {
///     Ok(c) => c,
///     Err(e) => {
///         eprintln!("{}", e.as_message());
///         std::process::exit(e.exit_code());
///     }
/// };
/// let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::new())];
///
/// if let Err(e) = voicekeeper::run_until_signal(platform, credentials, KeeperConfig::default(), subs).await {
///     eprintln!("{}", e.as_message());
///     std::process::exit(e.exit_code());
/// }
/// # }
/// ```
pub async fn run_until_signal<P>(
    platform: Arc<P>,
    credentials: Credentials,
    cfg: KeeperConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
) -> Result<(), RuntimeError>
where
    P: Platform + ?Sized,
{
    run_until(platform, credentials, cfg, subscribers, wait_for_shutdown_signal()).await
}

/// Same as [`run_until_signal`], stopping when `shutdown` completes instead.
pub async fn run_until<P, F>(
    platform: Arc<P>,
    credentials: Credentials,
    cfg: KeeperConfig,
    subscribers: Vec<Arc<dyn Subscribe>>,
    shutdown: F,
) -> Result<(), RuntimeError>
where
    P: Platform + ?Sized,
    F: Future<Output = io::Result<()>>,
{
    let bus = Bus::new(cfg.bus_capacity_clamped());
    let set = SubscriberSet::new(subscribers, bus.clone());
    let stop = CancellationToken::new();
    let listener = subscriber_listener(&bus, set, stop.clone());
    let token = CancellationToken::new();

    let result = tokio::select! {
        res = shutdown => match res {
            Ok(()) => {
                bus.publish(Event::new(EventKind::ShutdownRequested));
                token.cancel();
                Ok(())
            }
            Err(e) => Err(RuntimeError::Signal(e)),
        },
        res = serve(platform, &credentials, cfg, bus.clone(), token.child_token()) => res,
    };

    stop.cancel();
    match listener.await {
        Ok(set) => set.shutdown().await,
        Err(e) => tracing::warn!(error = %e, "subscriber listener failed"),
    }
    result
}

async fn serve<P>(
    platform: Arc<P>,
    credentials: &Credentials,
    cfg: KeeperConfig,
    bus: Bus,
    token: CancellationToken,
) -> Result<(), RuntimeError>
where
    P: Platform + ?Sized,
{
    let account = platform
        .login(&credentials.token)
        .await
        .map_err(|e| RuntimeError::AuthFailure { reason: e.0 })?;
    bus.publish(Event::new(EventKind::LoggedIn).with_subject(account.tag));

    Keeper::new(platform, credentials.target, cfg, bus)
        .run(token)
        .await;
    Ok(())
}

/// Forwards bus events to the subscriber set until `stop`, then drains what
/// is already buffered and hands the set back.
fn subscriber_listener(
    bus: &Bus,
    set: SubscriberSet,
    stop: CancellationToken,
) -> JoinHandle<SubscriberSet> {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                ev = rx.recv() => match ev {
                    Ok(ev) => set.emit(&ev),
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "subscriber listener lagged");
                    }
                    Err(RecvError::Closed) => break,
                },
                _ = stop.cancelled() => {
                    while let Ok(ev) = rx.try_recv() {
                        set.emit(&ev);
                    }
                    break;
                }
            }
        }
        set
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Token;
    use crate::subscribers::LogWriter;
    use crate::voice::fake::FakePlatform;
    use crate::voice::{ChannelId, GuildId, Target};
    use std::io::Write;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn lines(&self) -> Vec<String> {
            let raw = String::from_utf8(self.0.lock().unwrap().clone()).unwrap();
            raw.lines()
                .filter_map(|l| l.split_once("] ").map(|(_, msg)| msg.to_string()))
                .collect()
        }
    }

    fn credentials() -> Credentials {
        Credentials {
            token: Token::new("t"),
            target: Target::new(GuildId(111), ChannelId(222)),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_login_is_fatal() {
        let platform = FakePlatform::new(credentials().target);
        platform.reject_login("401 Unauthorized");

        let err = run_until(
            platform,
            credentials(),
            KeeperConfig::default(),
            Vec::new(),
            std::future::pending(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RuntimeError::AuthFailure { ref reason } if reason == "401 Unauthorized"));
        assert_eq!(err.as_message(), "Auth failed");
        assert_eq!(err.exit_code(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_signal_setup_is_fatal() {
        let platform = FakePlatform::new(credentials().target);
        let err = run_until(
            platform,
            credentials(),
            KeeperConfig::default(),
            Vec::new(),
            async { Err(io::Error::other("no signal support")) },
        )
        .await
        .unwrap_err();
        assert_eq!(err.as_label(), "runtime_signal");
    }

    #[tokio::test(start_paused = true)]
    async fn interrupt_returns_ok_after_logging() {
        let platform = FakePlatform::new(credentials().target);
        let out = Captured::default();
        let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter::with_sink(out.clone()))];
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(run_until(
            Arc::clone(&platform),
            credentials(),
            KeeperConfig::default(),
            subs,
            async move {
                let _ = rx.await;
                Ok(())
            },
        ));

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(platform.joins(), 1);
        tx.send(()).unwrap();
        handle.await.unwrap().unwrap();

        assert_eq!(
            out.lines(),
            vec![
                "USER: keeper#0001".to_string(),
                "CONNECTED: 222".to_string(),
                "SHUTDOWN: interrupt received".to_string(),
            ]
        );
        assert!(!platform.link(0).is_destroyed());
    }
}
