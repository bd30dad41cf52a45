//! Session credential loading, verification, and persistence.
//!
//! The session file accepts two shapes — a raw cookie string, or a
//! structured device/session descriptor — decided once at load time by
//! inspecting which known field is present. Both normalize into the
//! client's [`ClientState`].

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use dmgreet_client::{ClientState, CookieJar, DirectApi, Identity};

use crate::events::{EventSink, log_event};

/// Structured-blob fields that mark a serialized session descriptor.
const SERIALIZED_FIELDS: &[&str] = &["constants", "cookieJar", "deviceString", "uuid"];

/// The two accepted session-file shapes.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionBlob {
    /// Raw semicolon-separated `name=value` cookie header.
    CookieString(String),
    /// Serialized session in the client's native state format.
    Serialized(ClientState),
}

impl SessionBlob {
    /// Decide the shape by inspecting which known field is present. A
    /// `cookieString` field wins; otherwise any recognized structured
    /// field selects the serialized path. Returns `None` when neither
    /// shape matches or the structured blob does not deserialize.
    #[must_use]
    pub fn decode(value: &serde_json::Value) -> Option<Self> {
        if let Some(s) = value.get("cookieString").and_then(|v| v.as_str()) {
            return Some(Self::CookieString(s.to_string()));
        }
        if SERIALIZED_FIELDS.iter().any(|k| value.get(*k).is_some()) {
            return serde_json::from_value(value.clone())
                .ok()
                .map(Self::Serialized);
        }
        None
    }

    /// Normalize into the one internal credential representation.
    #[must_use]
    pub fn into_state(self) -> ClientState {
        match self {
            Self::CookieString(s) => ClientState {
                cookie_jar: CookieJar::from_cookie_string(&s),
                ..Default::default()
            },
            Self::Serialized(state) => state,
        }
    }
}

/// Loads, verifies, and persists the remote client's auth state.
///
/// Nothing here is ever fatal: failures are reported as log events and the
/// engine keeps running on whatever state the client currently holds.
pub struct SessionStore {
    path: PathBuf,
    sink: Arc<dyn EventSink>,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            path: path.into(),
            sink,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load credentials from the session file and install them on the
    /// client. Returns whether a usable credential was found. A missing
    /// file, malformed JSON, an unrecognized shape, and install failures
    /// all return false.
    pub async fn load(&self, client: &dyn DirectApi) -> bool {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return false,
            Err(e) => {
                log_event(self.sink.as_ref(), format!("Error loading session file: {e}")).await;
                return false;
            },
        };
        let value: serde_json::Value = match serde_json::from_str(&raw) {
            Ok(value) => value,
            Err(e) => {
                log_event(self.sink.as_ref(), format!("Error loading session file: {e}")).await;
                return false;
            },
        };
        let Some(blob) = SessionBlob::decode(&value) else {
            return false;
        };
        match &blob {
            SessionBlob::CookieString(_) => {
                log_event(self.sink.as_ref(), "Loading cookie string from session file").await;
            },
            SessionBlob::Serialized(_) => {
                log_event(self.sink.as_ref(), "Restoring serialized session state").await;
            },
        }
        match client.import_state(blob.into_state()).await {
            Ok(()) => true,
            Err(e) => {
                log_event(
                    self.sink.as_ref(),
                    format!("Error installing session state: {e}"),
                )
                .await;
                false
            },
        }
    }

    /// The remote "who am I" operation. Success logs the identity; failure
    /// logs and returns `None`. Never errors — failures are reported, not
    /// propagated.
    pub async fn verify(&self, client: &dyn DirectApi) -> Option<Identity> {
        match client.current_user().await {
            Ok(me) => {
                log_event(
                    self.sink.as_ref(),
                    format!("Logged in as {} (pk: {})", me.username, me.pk),
                )
                .await;
                Some(me)
            },
            Err(e) => {
                log_event(self.sink.as_ref(), format!("Login check failed: {e}")).await;
                None
            },
        }
    }

    /// Serialize the client's current auth state to the session file with
    /// stable formatting. Failures are logged, never fatal — a failed save
    /// must not crash the polling cycle that triggered it.
    pub async fn persist(&self, client: &dyn DirectApi) {
        let state = match client.export_state().await {
            Ok(state) => state,
            Err(e) => {
                log_event(self.sink.as_ref(), format!("Failed to save session: {e}")).await;
                return;
            },
        };
        let raw = match serde_json::to_string_pretty(&state) {
            Ok(raw) => raw,
            Err(e) => {
                log_event(self.sink.as_ref(), format!("Failed to save session: {e}")).await;
                return;
            },
        };
        if let Err(e) = std::fs::write(&self.path, raw) {
            log_event(self.sink.as_ref(), format!("Failed to save session: {e}")).await;
            return;
        }
        log_event(
            self.sink.as_ref(),
            format!("Saved session to {}", self.path.display()),
        )
        .await;
    }
}
