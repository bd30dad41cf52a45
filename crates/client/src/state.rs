//! Serializable authentication state for the remote client.
//!
//! Both accepted session-file shapes (raw cookie string, structured
//! device/session descriptor) normalize into [`ClientState`].

use serde::{Deserialize, Serialize};

/// Cookie domain installed for cookies parsed out of a raw cookie string.
pub const COOKIE_DOMAIN: &str = ".instagram.com";

/// Path installed for cookies parsed out of a raw cookie string.
pub const COOKIE_PATH: &str = "/";

/// One cookie as the session file stores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredCookie {
    pub key: String,
    pub value: String,
    pub domain: String,
    pub path: String,
    pub http_only: bool,
}

impl Default for StoredCookie {
    fn default() -> Self {
        Self {
            key: String::new(),
            value: String::new(),
            domain: COOKIE_DOMAIN.to_string(),
            path: COOKIE_PATH.to_string(),
            http_only: true,
        }
    }
}

/// Cookie container scoped to the remote service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CookieJar {
    pub cookies: Vec<StoredCookie>,
}

impl CookieJar {
    /// Insert a cookie, replacing any existing cookie with the same key.
    pub fn set(&mut self, cookie: StoredCookie) {
        if let Some(existing) = self.cookies.iter_mut().find(|c| c.key == cookie.key) {
            *existing = cookie;
        } else {
            self.cookies.push(cookie);
        }
    }

    /// Look up a cookie value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.value.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Parse a semicolon-separated `name=value` cookie header into a jar
    /// scoped to the service domain, path `/`, http-only.
    ///
    /// Segments without `=` and empty segments are skipped; a value keeps
    /// any embedded `=`.
    #[must_use]
    pub fn from_cookie_string(cookie_string: &str) -> Self {
        let mut jar = Self::default();
        for pair in cookie_string.split(';') {
            let pair = pair.trim();
            if pair.is_empty() {
                continue;
            }
            let Some(idx) = pair.find('=') else {
                continue;
            };
            let key = pair[..idx].trim();
            let value = pair[idx + 1..].trim();
            if key.is_empty() {
                continue;
            }
            jar.set(StoredCookie {
                key: key.to_string(),
                value: value.to_string(),
                ..Default::default()
            });
        }
        jar
    }
}

/// The one internal credential representation the remote client accepts.
///
/// Field names follow the structured session-file shape: `cookieJar`,
/// `deviceString`, `uuid`, `constants`. Unknown fields in the file are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientState {
    pub cookie_jar: CookieJar,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constants: Option<serde_json::Value>,
}

impl ClientState {
    /// Whether anything usable is present (cookies or a device descriptor).
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.cookie_jar.is_empty() || self.device_string.is_some() || self.uuid.is_some()
    }
}
