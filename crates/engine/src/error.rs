/// Crate-wide result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed engine errors. Everything raised inside a periodic trigger is
/// caught and logged at the trigger boundary; these only cross the crate
/// boundary from the externally-invoked control operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A call to the remote client failed.
    #[error("remote call failed: {context}: {source}")]
    Remote {
        context: String,
        #[source]
        source: dmgreet_client::Error,
    },

    /// File I/O on a persisted store failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn remote(context: impl Into<String>, source: dmgreet_client::Error) -> Self {
        Self::Remote {
            context: context.into(),
            source,
        }
    }
}
