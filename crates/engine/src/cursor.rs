use std::{collections::HashMap, sync::Mutex};

/// Last-seen newest message id per thread, used for dedupe.
///
/// Process-lifetime only: created at `start()`, cleared at `stop()`. Once
/// an id is recorded for a thread, everything up to it counts as handled;
/// only a change in the newest id triggers processing again.
#[derive(Debug, Default)]
pub struct ThreadCursorTable {
    seen: Mutex<HashMap<String, String>>,
}

impl ThreadCursorTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically check and record the newest id for a thread.
    ///
    /// Returns true (and records the id) when it differs from the stored
    /// one, including the first observation; false otherwise. The record
    /// happens at query time so the same `(thread, id)` pair can never be
    /// processed twice, and a failed reply is not retried on later cycles.
    pub fn observe(&self, thread_id: &str, newest_id: &str) -> bool {
        let mut seen = self.seen.lock().unwrap_or_else(|e| e.into_inner());
        match seen.get(thread_id) {
            Some(prev) if prev == newest_id => false,
            _ => {
                seen.insert(thread_id.to_string(), newest_id.to_string());
                true
            },
        }
    }

    /// Drop all recorded cursors.
    pub fn clear(&self) {
        self.seen
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
