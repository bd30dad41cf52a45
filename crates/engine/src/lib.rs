//! Polling-and-reply engine for a direct-message inbox.
//!
//! Flow: load session → arm the poll and keep-alive tickers → each cycle:
//! read config, fetch the inbox, diff newest items against per-thread
//! cursors, pace and send the configured welcome reply, persist stats and
//! session state, emit events to the dashboard sink.

pub mod config;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod events;
pub mod keepalive;
pub mod pacer;
pub mod session;
pub mod ticker;

pub use {
    config::{BotConfig, Stats},
    engine::PollingEngine,
    error::{Error, Result},
    events::{EngineEvent, EventSink, NullSink},
};
