//! Persisted bot configuration.
//!
//! The config file is the single source of truth between restarts and is
//! re-read at the start of every polling cycle, so dashboard edits apply
//! on the next cycle without a restart. Keys stay camelCase — the file is
//! shared with the dashboard layer.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// Counters persisted inside the config. Monotonically non-decreasing
/// within a process lifetime; reset only by external edit of the file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stats {
    pub messages_received: u64,
    pub messages_sent: u64,
}

/// Bot configuration, shared with (and also mutated by) the dashboard
/// layer. The engine only ever writes `stats`; `bot_running` is owned by
/// the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BotConfig {
    pub enabled: bool,
    pub welcome_message: String,
    pub stats: Stats,
    pub bot_running: bool,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            welcome_message:
                "Hi! Thanks for your message — I'll get back to you as soon as I can.".to_string(),
            stats: Stats::default(),
            bot_running: false,
        }
    }
}

impl BotConfig {
    /// Read and parse the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Read the config file, falling back to defaults when it is missing
    /// or unreadable. The dashboard layer uses this to seed the file.
    #[must_use]
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Write the config file with stable pretty formatting.
    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}
