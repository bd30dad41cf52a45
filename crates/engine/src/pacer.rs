//! Randomized reply pacing and the process-wide single-sender guard.

use std::{
    future::Future,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use {rand::Rng, tokio::sync::Mutex};

use crate::events::{EventSink, log_event};

/// Typing-simulation delay range before every reply.
pub const TYPING_DELAY_MIN_MS: u64 = 2500;
pub const TYPING_DELAY_MAX_MS: u64 = 8000;

/// Extra wait range when another send is already in flight.
pub const BUSY_WAIT_MIN_MS: u64 = 500;
pub const BUSY_WAIT_MAX_MS: u64 = 2000;

/// Clears the in-flight flag on every exit path of a send.
struct InFlightGuard<'a>(&'a AtomicBool);

impl<'a> InFlightGuard<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Paces outbound replies with human-like randomized delay and enforces
/// that at most one reply transmission is in flight at any instant, even
/// when several threads come due in the same cycle.
pub struct ReplyPacer {
    sink: Arc<dyn EventSink>,
    send_lock: Mutex<()>,
    in_flight: AtomicBool,
}

impl ReplyPacer {
    #[must_use]
    pub fn new(sink: Arc<dyn EventSink>) -> Self {
        Self {
            sink,
            send_lock: Mutex::new(()),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a send is currently in flight.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Simulate human reaction time before a reply: sleep a uniformly
    /// drawn typing delay, then — if another send is in flight — a short
    /// extra wait so outbound bursts never overlap. Best-effort: the
    /// actual mutual exclusion lives in [`Self::with_exclusive_send`].
    ///
    /// Returns the typing delay that was applied.
    pub async fn schedule(&self, thread_id: &str) -> Duration {
        let delay = Duration::from_millis(
            rand::rng().random_range(TYPING_DELAY_MIN_MS..=TYPING_DELAY_MAX_MS),
        );
        log_event(
            self.sink.as_ref(),
            format!(
                "Simulating typing for {} ms before replying to {thread_id}",
                delay.as_millis()
            ),
        )
        .await;
        tokio::time::sleep(delay).await;

        if self.is_sending() {
            let wait =
                Duration::from_millis(rand::rng().random_range(BUSY_WAIT_MIN_MS..=BUSY_WAIT_MAX_MS));
            log_event(
                self.sink.as_ref(),
                format!("Another send in progress; waiting {} ms", wait.as_millis()),
            )
            .await;
            tokio::time::sleep(wait).await;
        }

        delay
    }

    /// Run a send under the single-sender guard. Concurrent callers
    /// serialize; the guard and the in-flight flag are released on every
    /// exit path, success or failure.
    pub async fn with_exclusive_send<T, F, Fut>(&self, send: F) -> dmgreet_client::Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = dmgreet_client::Result<T>>,
    {
        let _guard = self.send_lock.lock().await;
        let _flag = InFlightGuard::raise(&self.in_flight);
        send().await
    }
}
