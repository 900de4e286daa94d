//! In-memory credential store. Data is lost on restart.

use super::{CredentialStore, PublicUserRecord, StoreError, UserRecord};
use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::HashMap;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserRecord>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored users.
    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

// Same shape as the Postgres `to_char` output: second precision, `Z` suffix.
fn now_rfc3339() -> Result<String, StoreError> {
    OffsetDateTime::now_utc()
        .replace_nanosecond(0)
        .map_err(|e| StoreError::Backend(anyhow!(e)))?
        .format(&Rfc3339)
        .map_err(|e| StoreError::Backend(anyhow!(e)))
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn create(&self, identity: &str, password_hash: &str) -> Result<Uuid, StoreError> {
        let mut users = self.users.write().await;

        if users.contains_key(identity) {
            return Err(StoreError::DuplicateIdentity);
        }

        let record = UserRecord {
            id: Uuid::now_v7(),
            identity: identity.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now_rfc3339()?,
        };
        let id = record.id;
        users.insert(record.identity.clone(), record);

        Ok(id)
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>, StoreError> {
        Ok(self.users.read().await.get(identity).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PublicUserRecord>, StoreError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|record| record.id == id)
            .map(UserRecord::public))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
