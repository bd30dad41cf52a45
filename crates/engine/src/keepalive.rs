//! Periodic activity simulation, independent of the polling cycle.

use std::{sync::Arc, time::Duration};

use {rand::Rng, tracing::debug};

use dmgreet_client::DirectApi;

use crate::{
    events::{EventSink, log_event},
    ticker::{self, TaskTicket},
};

/// Keep-alive period bounds in seconds. The period is drawn once, at arm
/// time.
pub const KEEP_ALIVE_MIN_SECS: u64 = 60;
pub const KEEP_ALIVE_MAX_SECS: u64 = 120;

/// Arm the keep-alive ticker: a lightweight timeline fetch on a random
/// interval that keeps the remote session looking active. Failures are
/// logged and otherwise ignored.
pub fn arm(client: Arc<dyn DirectApi>, sink: Arc<dyn EventSink>) -> TaskTicket {
    let period = Duration::from_secs(
        rand::rng().random_range(KEEP_ALIVE_MIN_SECS..=KEEP_ALIVE_MAX_SECS),
    );
    ticker::arm(
        move || period,
        move || {
            let client = Arc::clone(&client);
            let sink = Arc::clone(&sink);
            async move {
                match client.fetch_timeline().await {
                    Ok(count) => {
                        debug!(count, "keep-alive timeline fetch");
                        log_event(sink.as_ref(), "Performed keep-alive timeline fetch").await;
                    },
                    Err(e) => {
                        log_event(sink.as_ref(), format!("Keep-alive error: {e}")).await;
                    },
                }
            }
        },
    )
}
