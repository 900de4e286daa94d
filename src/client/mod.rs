//! Client-side session view.
//!
//! [`SessionView`] drives a [`SessionState`] through an [`AuthBackend`] and
//! publishes every transition on a `watch` channel. Rendering is a pure
//! function of the state.

use crate::store::PublicUserRecord;
use async_trait::async_trait;

pub mod http;
mod state;

pub use http::{ClientError, HttpAuthBackend};
pub use state::{LoginForm, SessionState, SessionView};

/// The auth API as seen by the session view.
#[async_trait]
pub trait AuthBackend: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Returns the server's confirmation message.
    async fn register(&self, identity: &str, password: &str) -> Result<String, Self::Error>;

    async fn login(&self, identity: &str, password: &str) -> Result<(), Self::Error>;

    async fn logout(&self) -> Result<(), Self::Error>;

    /// `None` when there is no valid session.
    async fn profile(&self) -> Result<Option<PublicUserRecord>, Self::Error>;
}
