// Where emitted alerts go.

use roomwatch_common::alert::Alert;
use tokio::sync::mpsc;
use tracing::info;

/// Receives alerts from the watch loop. Must not block: it is called
/// inline from the poll cycle.
pub trait AlertSink: Send + Sync + 'static {
    fn emit(&self, alert: Alert) -> Result<(), SinkError>;
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("alert receiver closed")]
    Closed,
    #[error("alert rejected: {0}")]
    Rejected(String),
}

/// Writes alerts to the log. Used by `roomwatchd` when no UI is attached.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl AlertSink for TracingSink {
    fn emit(&self, alert: Alert) -> Result<(), SinkError> {
        info!(
            title = %alert.title,
            detail = %alert.detail,
            level = alert.level.as_str(),
            timestamp = %alert.timestamp,
            "alert"
        );
        Ok(())
    }
}

/// Forwards alerts to an in-process consumer over an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<Alert>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Alert>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl AlertSink for ChannelSink {
    fn emit(&self, alert: Alert) -> Result<(), SinkError> {
        self.tx.send(alert).map_err(|_| SinkError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use roomwatch_common::alert::AlertLevel;

    fn alert() -> Alert {
        Alert {
            title: "Bob resolved your plumbing report".into(),
            detail: "Leaking tap".into(),
            level: AlertLevel::Success,
            timestamp: Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn channel_sink_forwards_alerts() {
        let (sink, mut rx) = ChannelSink::new();
        sink.emit(alert()).unwrap();
        assert_eq!(rx.try_recv().unwrap(), alert());
    }

    #[test]
    fn channel_sink_reports_closed_receiver() {
        let (sink, rx) = ChannelSink::new();
        drop(rx);
        assert_eq!(sink.emit(alert()), Err(SinkError::Closed));
    }

    #[test]
    fn tracing_sink_never_fails() {
        assert!(TracingSink.emit(alert()).is_ok());
    }
}
