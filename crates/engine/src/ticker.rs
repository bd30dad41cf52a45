//! Cancellable repeating background tasks.
//!
//! Replaces bare interval callbacks with an explicit ticket: arming
//! returns a [`TaskTicket`], revoking it gives `stop()` a precise
//! cancellation point. Revocation takes effect between runs — a run
//! already in progress completes (or fails) naturally.

use std::{future::Future, time::Duration};

use {tokio::task::JoinHandle, tokio_util::sync::CancellationToken};

/// Handle to an armed repeating task.
pub struct TaskTicket {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl TaskTicket {
    /// Disarm: no new run starts after this returns.
    pub fn revoke(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Disarm and wait for the loop (including any run in progress) to
    /// wind down.
    pub async fn revoke_and_wait(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}

/// Arm a repeating task. `period` is drawn fresh before every run, which
/// is how the poll ticker gets its per-tick jitter; fixed-interval callers
/// just return a constant.
pub fn arm<P, F, Fut>(mut period: P, mut task: F) -> TaskTicket
where
    P: FnMut() -> Duration + Send + 'static,
    F: FnMut() -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send,
{
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    let handle = tokio::spawn(async move {
        loop {
            let wait = period();
            tokio::select! {
                () = token.cancelled() => break,
                () = tokio::time::sleep(wait) => {},
            }
            // The sleep and a revoke can land on the same instant; the
            // ticket wins.
            if token.is_cancelled() {
                break;
            }
            task().await;
        }
    });
    TaskTicket { cancel, handle }
}
