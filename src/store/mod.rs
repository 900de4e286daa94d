//! Credential storage.
//!
//! One record per user, keyed by a unique identity. The store is injected into
//! the auth state as `Arc<dyn CredentialStore>`, so the server can run against
//! Postgres while tests use the in-memory implementation.
//!
//! Uniqueness is enforced by the backend itself (unique index or a single write
//! lock), never by a check-then-insert in the caller.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity already exists")]
    DuplicateIdentity,
    #[error("store backend error: {0}")]
    Backend(anyhow::Error),
}

/// Full user row, including the password hash. Never serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRecord {
    pub id: Uuid,
    pub identity: String,
    pub password_hash: String,
    pub created_at: String,
}

impl UserRecord {
    #[must_use]
    pub fn public(&self) -> PublicUserRecord {
        PublicUserRecord {
            id: self.id,
            identity: self.identity.clone(),
            created_at: self.created_at.clone(),
        }
    }
}

/// User data that may cross the API boundary.
#[derive(ToSchema, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUserRecord {
    pub id: Uuid,
    pub identity: String,
    pub created_at: String,
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user and return its id.
    ///
    /// # Errors
    /// `StoreError::DuplicateIdentity` when the identity is taken.
    async fn create(&self, identity: &str, password_hash: &str) -> Result<Uuid, StoreError>;

    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Lookup without the password hash.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<PublicUserRecord>, StoreError>;

    /// Liveness check used by `/health`.
    async fn ping(&self) -> Result<(), StoreError>;

    /// Short backend name for logs and health output.
    fn kind(&self) -> &'static str;
}
