//! Postgres-backed credential store.

use super::{CredentialStore, PublicUserRecord, StoreError, UserRecord};
use anyhow::Context;
use async_trait::async_trait;
use sqlx::{Connection, PgPool, Row};
use tracing::{debug, instrument};
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/sql/schema.sql"));

#[derive(Clone, Debug)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply `sql/schema.sql`. Every statement is idempotent.
    ///
    /// # Errors
    /// Returns an error if any statement fails.
    #[instrument(skip(self))]
    pub async fn migrate(&self) -> anyhow::Result<()> {
        for (index, statement) in split_sql_statements(SCHEMA_SQL).iter().enumerate() {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .with_context(|| format!("failed to execute schema statement {}", index + 1))?;
        }

        debug!("schema applied");

        Ok(())
    }
}

fn backend(err: sqlx::Error) -> StoreError {
    StoreError::Backend(err.into())
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();

    for line in sql.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") {
            continue;
        }
        current.push_str(line);
        current.push('\n');

        if trimmed.ends_with(';') {
            let statement = current.trim();
            if !statement.is_empty() {
                statements.push(statement.to_string());
            }
            current.clear();
        }
    }

    let leftover = current.trim();
    if !leftover.is_empty() {
        statements.push(leftover.to_string());
    }

    statements
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn create(&self, identity: &str, password_hash: &str) -> Result<Uuid, StoreError> {
        let id = Uuid::now_v7();

        match sqlx::query("INSERT INTO users (id, username, password_hash) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(identity)
            .bind(password_hash)
            .execute(&self.pool)
            .await
        {
            Ok(_) => Ok(id),
            Err(e) if is_unique_violation(&e) => Err(StoreError::DuplicateIdentity),
            Err(e) => Err(backend(e)),
        }
    }

    async fn find_by_identity(&self, identity: &str) -> Result<Option<UserRecord>, StoreError> {
        let query = r#"
            SELECT
                id,
                username,
                password_hash,
                to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
            FROM users
            WHERE username = $1
            LIMIT 1
        "#;
        let row = sqlx::query(query)
            .bind(identity)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(|row| UserRecord {
            id: row.get("id"),
            identity: row.get("username"),
            password_hash: row.get("password_hash"),
            created_at: row.get("created_at"),
        }))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<PublicUserRecord>, StoreError> {
        let query = r#"
            SELECT
                id,
                username,
                to_char(created_at AT TIME ZONE 'utc', 'YYYY-MM-DD"T"HH24:MI:SS"Z"') AS created_at
            FROM users
            WHERE id = $1
            LIMIT 1
        "#;
        let row = sqlx::query(query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend)?;

        Ok(row.map(|row| PublicUserRecord {
            id: row.get("id"),
            identity: row.get("username"),
            created_at: row.get("created_at"),
        }))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await.map_err(backend)?;
        conn.ping().await.map_err(backend)
    }

    fn kind(&self) -> &'static str {
        "postgres"
    }
}
