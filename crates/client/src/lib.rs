//! Boundary to the remote direct-message service.
//!
//! The engine never talks to the network directly: everything goes through
//! the [`DirectApi`] trait, and authentication travels as a [`ClientState`]
//! blob that the concrete client serializes and deserializes on demand.

pub mod api;
pub mod error;
pub mod state;
pub mod types;

pub use {
    api::DirectApi,
    error::{Error, Result},
    state::{ClientState, CookieJar, StoredCookie},
    types::{DirectThread, Identity, ThreadItem},
};
