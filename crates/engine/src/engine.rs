//! The polling engine: per-cycle state machine and control surface.

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    time::Duration,
};

use {
    rand::Rng,
    tracing::{info, warn},
};

use dmgreet_client::{ClientState, DirectApi, DirectThread};

use crate::{
    config::BotConfig,
    cursor::ThreadCursorTable,
    error::Error,
    events::{EngineEvent, EventSink, log_event, now_ms},
    keepalive,
    pacer::ReplyPacer,
    session::SessionStore,
    ticker::{self, TaskTicket},
};

/// Base polling interval.
pub const POLL_BASE_INTERVAL_MS: i64 = 10_000;

/// Symmetric jitter applied to every poll interval so the cadence is not a
/// detectable fixed beat.
pub const POLL_JITTER_MS: i64 = 3_000;

/// Placeholder body emitted for items that carry no text.
const NON_TEXT_PLACEHOLDER: &str = "[non-text message]";

#[derive(Default)]
struct Timers {
    poll: Option<TaskTicket>,
    keep_alive: Option<TaskTicket>,
}

/// The polling-and-reply engine for one inbox.
///
/// Everything the engine needs lives in fields of this instance — client
/// handle, session store, cursor table, pacer, armed timers — so multiple
/// independent engines can coexist and tests get clean state.
pub struct PollingEngine {
    client: Arc<dyn DirectApi>,
    sink: Arc<dyn EventSink>,
    config_path: PathBuf,
    session: SessionStore,
    cursors: ThreadCursorTable,
    pacer: ReplyPacer,
    timers: Mutex<Timers>,
}

impl PollingEngine {
    pub fn new(
        client: Arc<dyn DirectApi>,
        sink: Arc<dyn EventSink>,
        config_path: impl Into<PathBuf>,
        session_path: impl Into<PathBuf>,
    ) -> Arc<Self> {
        Arc::new(Self {
            session: SessionStore::new(session_path, Arc::clone(&sink)),
            pacer: ReplyPacer::new(Arc::clone(&sink)),
            cursors: ThreadCursorTable::new(),
            client,
            sink,
            config_path: config_path.into(),
            timers: Mutex::new(Timers::default()),
        })
    }

    /// Load the session and arm the periodic triggers. Idempotent re-arm:
    /// previously armed timers are revoked and replaced. The first polling
    /// cycle runs before this returns.
    pub async fn start(self: &Arc<Self>) -> anyhow::Result<()> {
        if self.session.load(self.client.as_ref()).await {
            self.session.verify(self.client.as_ref()).await;
        } else {
            log_event(
                self.sink.as_ref(),
                "No usable session found. Use the dashboard to import cookies or upload a serialized session.",
            )
            .await;
            if let Err(e) = self.client.import_state(ClientState::default()).await {
                warn!(error = %e, "failed to install empty auth state");
            }
        }

        let poll = {
            let engine = Arc::clone(self);
            ticker::arm(
                || {
                    let jitter = rand::rng().random_range(-POLL_JITTER_MS..=POLL_JITTER_MS);
                    Duration::from_millis((POLL_BASE_INTERVAL_MS + jitter).max(0) as u64)
                },
                move || {
                    let engine = Arc::clone(&engine);
                    async move { engine.run_cycle().await }
                },
            )
        };
        let keep_alive = keepalive::arm(Arc::clone(&self.client), Arc::clone(&self.sink));

        {
            let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(prev) = timers.poll.replace(poll) {
                prev.revoke();
            }
            if let Some(prev) = timers.keep_alive.replace(keep_alive) {
                prev.revoke();
            }
        }
        info!("polling engine armed");

        self.run_cycle().await;
        Ok(())
    }

    /// Disarm the periodic triggers, persist session state, and release
    /// in-memory cycle state. A cycle already in progress completes (or
    /// fails) naturally; its side effects still apply.
    pub async fn stop(&self) {
        {
            let mut timers = self.timers.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(ticket) = timers.poll.take() {
                ticket.revoke();
            }
            if let Some(ticket) = timers.keep_alive.take() {
                ticket.revoke();
            }
        }
        self.session.persist(self.client.as_ref()).await;
        self.cursors.clear();
        info!("polling engine stopped");
    }

    /// Forward an externally-applied config change to observers. The
    /// engine itself re-reads the file each cycle regardless.
    pub async fn update_config(&self, config: BotConfig) {
        self.sink.emit(EngineEvent::Config { config }).await;
    }

    /// Re-load and verify the session from the (possibly just-uploaded)
    /// session file, reporting the outcome as log events. Returns whether
    /// a usable credential was found.
    pub async fn reload_session(&self) -> bool {
        if self.session.load(self.client.as_ref()).await {
            if self.session.verify(self.client.as_ref()).await.is_some() {
                log_event(self.sink.as_ref(), "Session loaded and verified.").await;
            } else {
                log_event(
                    self.sink.as_ref(),
                    "Session loaded but login verification failed. Cookies may be incomplete or expired.",
                )
                .await;
            }
            true
        } else {
            log_event(self.sink.as_ref(), "No cookies or session found in session file.").await;
            false
        }
    }

    /// Run one polling cycle. This is the terminal-local error boundary
    /// for the poll trigger: failures become a log event and the next
    /// scheduled cycle retries from scratch.
    pub async fn run_cycle(&self) {
        if let Err(e) = self.cycle().await {
            log_event(self.sink.as_ref(), format!("Polling error: {e}")).await;
        }
    }

    async fn cycle(&self) -> crate::Result<()> {
        // Fresh read every cycle so dashboard edits apply without restart.
        let mut cfg = BotConfig::load(&self.config_path)?;
        if !cfg.enabled {
            self.sink
                .emit(EngineEvent::Stats {
                    stats: cfg.stats.clone(),
                })
                .await;
            return Ok(());
        }

        let threads = self
            .client
            .direct_inbox()
            .await
            .map_err(|e| Error::remote("fetch inbox", e))?;
        self.sink
            .emit(EngineEvent::ThreadCount {
                count: threads.len(),
            })
            .await;
        if threads.is_empty() {
            return Ok(());
        }

        // Own identity distinguishes inbound messages from self-sent ones.
        let my_id = self
            .session
            .verify(self.client.as_ref())
            .await
            .map(|me| me.pk);

        for thread in &threads {
            self.process_thread(&mut cfg, thread, my_id).await;
        }
        Ok(())
    }

    /// Handle one thread: dedupe on the newest item, notify observers,
    /// update counters, and reply when due. Failures here are isolated to
    /// this thread — the siblings in the same cycle still run.
    async fn process_thread(&self, cfg: &mut BotConfig, thread: &DirectThread, my_id: Option<u64>) {
        let Some(item) = thread.newest() else {
            return;
        };
        let Some(item_id) = item.item_id.as_deref() else {
            return;
        };
        if !self.cursors.observe(&thread.thread_id, item_id) {
            // Newest id unchanged: already handled.
            return;
        }

        let sender_id = item.user_id;
        let text = item.body().unwrap_or_default();
        self.sink
            .emit(EngineEvent::NewMessage {
                thread_id: thread.thread_id.clone(),
                from_user_id: sender_id,
                text: if text.is_empty() {
                    NON_TEXT_PLACEHOLDER.to_string()
                } else {
                    text.to_string()
                },
                ts: now_ms(),
            })
            .await;

        // Only a known foreign sender counts as inbound; self-authored and
        // sender-less (system) items advance the cursor without stats or a
        // reply.
        let inbound = matches!((sender_id, my_id), (Some(sender), Some(me)) if sender != me);
        if !inbound {
            return;
        }

        cfg.stats.messages_received += 1;
        self.persist_config(cfg).await;
        self.sink
            .emit(EngineEvent::Stats {
                stats: cfg.stats.clone(),
            })
            .await;

        if cfg.enabled {
            self.send_reply(&thread.thread_id, cfg).await;
        } else {
            log_event(
                self.sink.as_ref(),
                format!(
                    "New message in {} but auto-reply disabled",
                    thread.thread_id
                ),
            )
            .await;
        }
    }

    async fn send_reply(&self, thread_id: &str, cfg: &mut BotConfig) {
        let message = cfg.welcome_message.clone();
        self.pacer.schedule(thread_id).await;
        let result = self
            .pacer
            .with_exclusive_send(|| self.client.broadcast_text(thread_id, &message))
            .await;
        match result {
            Ok(()) => {
                log_event(self.sink.as_ref(), format!("Replied to thread {thread_id}")).await;
                cfg.stats.messages_sent += 1;
                self.persist_config(cfg).await;
                self.sink
                    .emit(EngineEvent::Stats {
                        stats: cfg.stats.clone(),
                    })
                    .await;
                // Activity can rotate tokens on the remote side; capture it.
                self.session.persist(self.client.as_ref()).await;
            },
            Err(e) => {
                log_event(self.sink.as_ref(), format!("Failed to send reply: {e}")).await;
            },
        }
    }

    /// Whole-file config write; last write wins (shared with the dashboard
    /// layer, no locking). Failures are logged only — in-memory counters
    /// stay authoritative for the rest of the process lifetime.
    async fn persist_config(&self, cfg: &BotConfig) {
        if let Err(e) = cfg.save(&self.config_path) {
            log_event(self.sink.as_ref(), format!("Failed to save config: {e}")).await;
        }
    }
}
