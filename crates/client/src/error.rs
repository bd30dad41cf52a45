use std::error::Error as StdError;

/// Crate-wide result type for remote-client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed errors surfaced across the client boundary.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input payload or parameter is invalid.
    #[error("invalid client input: {message}")]
    InvalidInput { message: String },

    /// Operation is currently unavailable (no session, not connected).
    #[error("client operation unavailable: {message}")]
    Unavailable { message: String },

    /// Wrapped source error from the underlying transport.
    #[error("client operation failed: {context}: {source}")]
    External {
        context: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// JSON (de)serialization failed.
    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),
}

impl Error {
    #[must_use]
    pub fn invalid_input(message: impl std::fmt::Display) -> Self {
        Self::InvalidInput {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn unavailable(message: impl std::fmt::Display) -> Self {
        Self::Unavailable {
            message: message.to_string(),
        }
    }

    #[must_use]
    pub fn external(
        context: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::External {
            context: context.into(),
            source: Box::new(source),
        }
    }
}
