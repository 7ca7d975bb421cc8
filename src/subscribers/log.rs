//! # LogWriter: operator-facing log lines
//!
//! Renders the events an operator cares about as timestamped lines and writes
//! them to stdout (or any [`Write`] sink). Everything else is left to
//! `tracing` diagnostics.
//!
//! ## Example output
//! ```text
//! [2026-10-17T09:12:03.418Z] USER: keeper#0001
//! [2026-10-17T09:12:05.502Z] CONNECTED: 222
//! [2026-10-17T09:14:11.009Z] LINK: transient disconnect recovered
//! [2026-10-17T09:20:40.771Z] WARN: Link lost. Retry 1s
//! [2026-10-17T09:20:41.779Z] CONNECTED: 222
//! [2026-10-17T11:02:00.000Z] SHUTDOWN: interrupt received
//! ```

use std::io::{self, Write};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Event writer subscriber.
pub struct LogWriter {
    sink: Mutex<Box<dyn Write + Send>>,
}

impl Default for LogWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl LogWriter {
    /// Writer to stdout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(io::stdout())
    }

    /// Writer to an arbitrary sink (files, test buffers).
    #[must_use]
    pub fn with_sink(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: Mutex::new(Box::new(sink)),
        }
    }

    /// Message part of the line for `e`, or `None` if the event is not shown.
    pub fn message(e: &Event) -> Option<String> {
        let msg = match e.kind {
            EventKind::LoggedIn => {
                format!("USER: {}", e.subject.as_deref().unwrap_or("unknown"))
            }
            EventKind::Connected => match e.channel {
                Some(channel) => format!("CONNECTED: {channel}"),
                None => "CONNECTED".to_string(),
            },
            EventKind::BackoffScheduled => {
                let secs = e.delay_ms.map(|ms| f64::from(ms) / 1000.0).unwrap_or(0.0);
                format!(
                    "WARN: {}. Retry {secs}s",
                    e.reason.as_deref().unwrap_or("unknown")
                )
            }
            EventKind::TransientDisconnect => "LINK: transient disconnect recovered".to_string(),
            EventKind::ShutdownRequested => "SHUTDOWN: interrupt received".to_string(),
            EventKind::SubscriberPanicked => format!(
                "WARN: subscriber {} panicked: {}",
                e.subject.as_deref().unwrap_or("unknown"),
                e.reason.as_deref().unwrap_or("unknown"),
            ),
            _ => return None,
        };
        Some(msg)
    }

    /// Full line: `[<ISO8601>] <message>`.
    pub fn render(e: &Event) -> Option<String> {
        let at: DateTime<Utc> = e.at.into();
        Self::message(e)
            .map(|msg| format!("[{}] {msg}", at.to_rfc3339_opts(SecondsFormat::Millis, true)))
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let Some(line) = Self::render(e) else {
            return;
        };
        let mut sink = match self.sink.lock() {
            Ok(sink) => sink,
            Err(poisoned) => poisoned.into_inner(),
        };
        if let Err(error) = writeln!(sink, "{line}").and_then(|()| sink.flush()) {
            tracing::debug!(%error, "log line dropped");
        }
    }

    fn wants(&self, kind: EventKind) -> bool {
        matches!(
            kind,
            EventKind::LoggedIn
                | EventKind::Connected
                | EventKind::BackoffScheduled
                | EventKind::TransientDisconnect
                | EventKind::ShutdownRequested
                | EventKind::SubscriberPanicked
        )
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::ChannelId;
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn connected_line() {
        let ev = Event::new(EventKind::Connected).with_channel(ChannelId(222));
        assert_eq!(LogWriter::message(&ev).as_deref(), Some("CONNECTED: 222"));
    }

    #[test]
    fn retry_line_uses_whole_seconds() {
        let ev = Event::new(EventKind::BackoffScheduled)
            .with_reason("Ready not reached within 90s")
            .with_delay(Duration::from_millis(1000));
        assert_eq!(
            LogWriter::message(&ev).as_deref(),
            Some("WARN: Ready not reached within 90s. Retry 1s")
        );

        let capped = Event::new(EventKind::BackoffScheduled)
            .with_reason("Link lost")
            .with_delay(Duration::from_secs(60));
        assert_eq!(
            LogWriter::message(&capped).as_deref(),
            Some("WARN: Link lost. Retry 60s")
        );
    }

    #[test]
    fn internal_events_are_not_rendered() {
        assert!(LogWriter::message(&Event::new(EventKind::RetryIgnored)).is_none());
        assert!(LogWriter::message(&Event::new(EventKind::SessionDestroyed)).is_none());
    }

    #[test]
    fn line_starts_with_iso8601_timestamp() {
        let ev = Event::new(EventKind::LoggedIn).with_subject("keeper#0001");
        let line = LogWriter::render(&ev).unwrap();

        let (stamp, rest) = line.split_once("] ").unwrap();
        let stamp = stamp.strip_prefix('[').unwrap();
        assert!(DateTime::parse_from_rfc3339(stamp).is_ok(), "bad stamp {stamp}");
        assert_eq!(rest, "USER: keeper#0001");
    }

    #[test]
    fn wants_exactly_the_rendered_kinds() {
        let writer = LogWriter::with_sink(io::sink());
        for kind in [
            EventKind::SubscriberPanicked,
            EventKind::SubscriberOverflow,
            EventKind::LoggedIn,
            EventKind::ShutdownRequested,
            EventKind::AttemptStarting,
            EventKind::Connected,
            EventKind::AttemptFailed,
            EventKind::TransientDisconnect,
            EventKind::LinkLost,
            EventKind::SessionDestroyed,
            EventKind::BackoffScheduled,
            EventKind::RetryIgnored,
        ] {
            let rendered = LogWriter::message(&Event::new(kind)).is_some();
            assert_eq!(writer.wants(kind), rendered, "{kind:?}");
        }
    }

    #[tokio::test]
    async fn writes_to_sink() {
        let buf = SharedBuf::default();
        let writer = LogWriter::with_sink(buf.clone());

        writer
            .on_event(&Event::new(EventKind::Connected).with_channel(ChannelId(7)))
            .await;
        writer.on_event(&Event::new(EventKind::AttemptStarting)).await;

        let out = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(out.lines().count(), 1);
        assert!(out.trim_end().ends_with("] CONNECTED: 7"));
    }
}
