use async_trait::async_trait;

use crate::{
    Result,
    state::ClientState,
    types::{DirectThread, Identity},
};

/// The remote direct-message service, as the engine sees it.
///
/// Concrete implementations own the transport; the engine only needs these
/// six operations. Auth state travels as [`ClientState`] so the engine can
/// persist it between runs without knowing what is inside.
#[async_trait]
pub trait DirectApi: Send + Sync {
    /// The remote "who am I" operation.
    async fn current_user(&self) -> Result<Identity>;

    /// Fetch the inbox thread list, newest activity first.
    async fn direct_inbox(&self) -> Result<Vec<DirectThread>>;

    /// Send a text message to a thread.
    async fn broadcast_text(&self, thread_id: &str, text: &str) -> Result<()>;

    /// Lightweight timeline fetch used to keep the session looking active.
    /// Returns the number of items fetched.
    async fn fetch_timeline(&self) -> Result<usize>;

    /// Serialize the current auth state.
    async fn export_state(&self) -> Result<ClientState>;

    /// Install auth state, replacing whatever the client held before.
    async fn import_state(&self, state: ClientState) -> Result<()>;
}
