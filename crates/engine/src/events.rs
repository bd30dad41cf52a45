use std::time::{SystemTime, UNIX_EPOCH};

use {async_trait::async_trait, serde::Serialize, tracing::info};

use crate::config::{BotConfig, Stats};

/// Events emitted by the engine for real-time dashboard updates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEvent {
    /// Operator-readable log line (mirrors the tracing output).
    Log { message: String, ts: u64 },
    /// Current stats counters.
    Stats { stats: Stats },
    /// Total threads seen by the latest inbox fetch.
    ThreadCount { count: usize },
    /// A thread's newest item changed.
    NewMessage {
        thread_id: String,
        from_user_id: Option<u64>,
        text: String,
        ts: u64,
    },
    /// The dashboard edited the config; forwarded to other observers.
    Config { config: BotConfig },
}

/// Sink for engine events — the dashboard layer provides the concrete
/// implementation. Delivery is fire-and-forget: a slow or absent observer
/// must never block or fail the engine.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn emit(&self, event: EngineEvent);
}

/// Sink that discards every event, for callers without an observer.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

#[async_trait]
impl EventSink for NullSink {
    async fn emit(&self, _event: EngineEvent) {}
}

/// Milliseconds since the UNIX epoch.
pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Trace a line and forward it to the sink as a [`EngineEvent::Log`].
pub(crate) async fn log_event(sink: &dyn EventSink, message: impl Into<String>) {
    let message = message.into();
    info!("{message}");
    sink.emit(EngineEvent::Log {
        message,
        ts: now_ms(),
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_kind_tag() {
        let event = EngineEvent::NewMessage {
            thread_id: "t1".into(),
            from_user_id: Some(7),
            text: "hi".into(),
            ts: 123,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "new_message");
        assert_eq!(json["thread_id"], "t1");
        assert_eq!(json["from_user_id"], 7);
        assert_eq!(json["text"], "hi");
        assert_eq!(json["ts"], 123);
    }

    #[test]
    fn stats_event_carries_counters() {
        let event = EngineEvent::Stats {
            stats: Stats {
                messages_received: 3,
                messages_sent: 2,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "stats");
        assert_eq!(json["stats"]["messagesReceived"], 3);
        assert_eq!(json["stats"]["messagesSent"], 2);
    }

    #[test]
    fn thread_count_event() {
        let json = serde_json::to_value(EngineEvent::ThreadCount { count: 0 }).unwrap();
        assert_eq!(json["kind"], "thread_count");
        assert_eq!(json["count"], 0);
    }
}
