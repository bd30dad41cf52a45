use serde::{Deserialize, Serialize};

/// The authenticated account, as reported by the remote "who am I" call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Numeric account id.
    pub pk: u64,
    /// Display name.
    pub username: String,
}

/// One inbox conversation. `items` are ordered newest-first; only the
/// newest item is ever inspected for new activity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectThread {
    pub thread_id: String,
    pub items: Vec<ThreadItem>,
}

impl DirectThread {
    /// The newest item in the thread, if any.
    #[must_use]
    pub fn newest(&self) -> Option<&ThreadItem> {
        self.items.first()
    }
}

/// A single message item as the remote wire format carries it. Every field
/// is optional: system items arrive without a sender, non-text items
/// without a body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadItem {
    pub item_id: Option<String>,
    pub user_id: Option<u64>,
    pub item_type: Option<String>,
    pub text: Option<String>,
    pub message: Option<String>,
}

impl ThreadItem {
    /// Extract the message body: the `text` field, or `message` when the
    /// item type is "text". Anything else has no textual body.
    #[must_use]
    pub fn body(&self) -> Option<&str> {
        if let Some(text) = self.text.as_deref() {
            return Some(text);
        }
        if self.item_type.as_deref() == Some("text") {
            return self.message.as_deref();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_prefers_text_field() {
        let item = ThreadItem {
            text: Some("hello".into()),
            message: Some("ignored".into()),
            ..Default::default()
        };
        assert_eq!(item.body(), Some("hello"));
    }

    #[test]
    fn body_falls_back_to_message_for_text_items() {
        let item = ThreadItem {
            item_type: Some("text".into()),
            message: Some("from message field".into()),
            ..Default::default()
        };
        assert_eq!(item.body(), Some("from message field"));
    }

    #[test]
    fn body_absent_for_media_items() {
        let item = ThreadItem {
            item_type: Some("media".into()),
            message: Some("not a text item".into()),
            ..Default::default()
        };
        assert_eq!(item.body(), None);
    }

    #[test]
    fn thread_deserializes_with_missing_fields() {
        let thread: DirectThread = serde_json::from_str(
            r#"{"thread_id": "t1", "items": [{"item_id": "m1", "user_id": 42}]}"#,
        )
        .unwrap();
        assert_eq!(thread.thread_id, "t1");
        let newest = thread.newest().unwrap();
        assert_eq!(newest.item_id.as_deref(), Some("m1"));
        assert_eq!(newest.user_id, Some(42));
        assert!(newest.body().is_none());
    }
}
