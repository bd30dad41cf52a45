#![allow(dead_code)]

use std::{
    path::PathBuf,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;

use {
    dmgreet_client::{
        ClientState, DirectApi, DirectThread, Error, Identity, Result, ThreadItem,
    },
    dmgreet_engine::{BotConfig, EngineEvent, EventSink, PollingEngine, Stats},
};

/// In-memory stand-in for the remote direct-message service.
#[derive(Default)]
pub struct MockApi {
    pub identity: Mutex<Option<Identity>>,
    pub inbox: Mutex<Vec<DirectThread>>,
    pub inbox_calls: AtomicUsize,
    pub fail_inbox: AtomicBool,
    pub sent: Mutex<Vec<(String, String)>>,
    pub fail_threads: Mutex<Vec<String>>,
    pub state: Mutex<ClientState>,
    pub import_calls: AtomicUsize,
    pub timeline_calls: AtomicUsize,
}

impl MockApi {
    pub fn logged_in(pk: u64, username: &str) -> Arc<Self> {
        let api = Self::default();
        *api.identity.lock().unwrap() = Some(Identity {
            pk,
            username: username.to_string(),
        });
        Arc::new(api)
    }

    pub fn set_inbox(&self, threads: Vec<DirectThread>) {
        *self.inbox.lock().unwrap() = threads;
    }

    /// Make `broadcast_text` fail for one specific thread.
    pub fn fail_send_for(&self, thread_id: &str) {
        self.fail_threads.lock().unwrap().push(thread_id.to_string());
    }

    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectApi for MockApi {
    async fn current_user(&self) -> Result<Identity> {
        self.identity
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| Error::unavailable("not logged in"))
    }

    async fn direct_inbox(&self) -> Result<Vec<DirectThread>> {
        self.inbox_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_inbox.load(Ordering::SeqCst) {
            return Err(Error::unavailable("inbox fetch failed"));
        }
        Ok(self.inbox.lock().unwrap().clone())
    }

    async fn broadcast_text(&self, thread_id: &str, text: &str) -> Result<()> {
        if self
            .fail_threads
            .lock()
            .unwrap()
            .iter()
            .any(|t| t == thread_id)
        {
            return Err(Error::unavailable("send failed"));
        }
        self.sent
            .lock()
            .unwrap()
            .push((thread_id.to_string(), text.to_string()));
        Ok(())
    }

    async fn fetch_timeline(&self) -> Result<usize> {
        self.timeline_calls.fetch_add(1, Ordering::SeqCst);
        Ok(0)
    }

    async fn export_state(&self) -> Result<ClientState> {
        Ok(self.state.lock().unwrap().clone())
    }

    async fn import_state(&self, state: ClientState) -> Result<()> {
        self.import_calls.fetch_add(1, Ordering::SeqCst);
        *self.state.lock().unwrap() = state;
        Ok(())
    }
}

/// Sink that records every event for later assertions.
#[derive(Default)]
pub struct RecordingSink {
    pub events: Mutex<Vec<EngineEvent>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    pub fn new_messages(&self) -> Vec<(String, Option<u64>, String)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::NewMessage {
                    thread_id,
                    from_user_id,
                    text,
                    ..
                } => Some((thread_id, from_user_id, text)),
                _ => None,
            })
            .collect()
    }

    pub fn stats_events(&self) -> Vec<Stats> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::Stats { stats } => Some(stats),
                _ => None,
            })
            .collect()
    }

    pub fn thread_counts(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::ThreadCount { count } => Some(count),
                _ => None,
            })
            .collect()
    }

    pub fn logs(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                EngineEvent::Log { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// An engine wired to a mock client and a recording sink, with file-backed
/// config and session paths in a fresh temp dir.
pub struct TestBed {
    pub api: Arc<MockApi>,
    pub sink: Arc<RecordingSink>,
    pub engine: Arc<PollingEngine>,
    pub config_path: PathBuf,
    pub session_path: PathBuf,
    dir: tempfile::TempDir,
}

pub fn testbed(cfg: &BotConfig) -> TestBed {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("config.json");
    let session_path = dir.path().join("session.json");
    cfg.save(&config_path).unwrap();

    let api = MockApi::logged_in(1, "me");
    let sink = RecordingSink::new();
    let engine = PollingEngine::new(
        Arc::clone(&api) as Arc<dyn DirectApi>,
        Arc::clone(&sink) as Arc<dyn EventSink>,
        &config_path,
        &session_path,
    );
    TestBed {
        api,
        sink,
        engine,
        config_path,
        session_path,
        dir,
    }
}

/// A thread whose newest item has the given id, sender, and text.
pub fn thread(
    thread_id: &str,
    item_id: &str,
    user_id: Option<u64>,
    text: Option<&str>,
) -> DirectThread {
    DirectThread {
        thread_id: thread_id.to_string(),
        items: vec![ThreadItem {
            item_id: Some(item_id.to_string()),
            user_id,
            text: text.map(str::to_string),
            ..Default::default()
        }],
    }
}
