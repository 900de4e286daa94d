//! Register, login and profile orchestration.
//!
//! Flow Overview:
//! 1) `register`: validate, hash on the blocking pool, insert. No auto-login.
//! 2) `login`: look up, verify, issue a token for the session cookie.
//! 3) `profile`: resolve a verified user id to its public record.
//!
//! Logout has no server-side work: tokens are stateless, so the handler only
//! clears the cookie. A copied token stays valid until it expires.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{
    error::AuthError, password::PasswordHasher, token::TokenIssuer, types::FieldError,
};
use crate::store::{CredentialStore, PublicUserRecord};

pub const IDENTITY_MIN_LENGTH: usize = 3;
pub const PASSWORD_MIN_LENGTH: usize = 6;

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    tokens: TokenIssuer,
    // Verified against when the identity is unknown, so both login failures
    // spend the same hashing time.
    dummy_hash: String,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("store", &self.store.kind())
            .field("tokens", &self.tokens)
            .finish_non_exhaustive()
    }
}

/// Trim the identity and check both fields, reporting every failure.
///
/// # Errors
/// Returns the list of failing fields.
pub fn validate_registration(identity: &str, password: &str) -> Result<String, Vec<FieldError>> {
    let identity = identity.trim();
    let mut errors = Vec::new();

    if identity.chars().count() < IDENTITY_MIN_LENGTH {
        errors.push(FieldError {
            field: "identity".to_string(),
            message: format!("Identity must be at least {IDENTITY_MIN_LENGTH} characters"),
        });
    }

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        errors.push(FieldError {
            field: "password".to_string(),
            message: format!("Password must be at least {PASSWORD_MIN_LENGTH} characters"),
        });
    }

    if errors.is_empty() {
        Ok(identity.to_string())
    } else {
        Err(errors)
    }
}

impl AuthService {
    /// # Errors
    /// Returns an error if the placeholder hash cannot be computed.
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        tokens: TokenIssuer,
    ) -> Result<Self> {
        let dummy_hash = hasher.hash(&Uuid::new_v4().to_string())?;
        Ok(Self {
            store,
            hasher,
            tokens,
            dummy_hash,
        })
    }

    #[must_use]
    pub fn tokens(&self) -> &TokenIssuer {
        &self.tokens
    }

    #[must_use]
    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Create a new user. Returns the new user id.
    ///
    /// # Errors
    /// `Validation` for short fields, `DuplicateIdentity` when taken,
    /// `Internal` for store or hashing failures.
    #[instrument(skip(self, password))]
    pub async fn register(&self, identity: &str, password: &str) -> Result<Uuid, AuthError> {
        let identity = validate_registration(identity, password).map_err(AuthError::Validation)?;

        let password_hash = self.hasher.hash_blocking(password.to_string()).await?;

        let id = self.store.create(&identity, &password_hash).await?;

        info!(user_id = %id, "user registered");

        Ok(id)
    }

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    /// `InvalidCredentials` for an unknown identity or a wrong password,
    /// `Internal` for store or signing failures.
    #[instrument(skip(self, password))]
    pub async fn login(&self, identity: &str, password: &str) -> Result<String, AuthError> {
        let identity = identity.trim();

        let Some(user) = self.store.find_by_identity(identity).await? else {
            let _ = self
                .hasher
                .verify_blocking(password.to_string(), self.dummy_hash.clone())
                .await;
            debug!("unknown identity");
            return Err(AuthError::InvalidCredentials);
        };

        if !self
            .hasher
            .verify_blocking(password.to_string(), user.password_hash)
            .await
        {
            debug!(user_id = %user.id, "password mismatch");
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;

        info!(user_id = %user.id, "login successful");

        Ok(token)
    }

    /// Public profile for an already verified user id.
    ///
    /// # Errors
    /// `NotFound` if the record is gone, `Internal` for store failures.
    #[instrument(skip(self))]
    pub async fn profile(&self, user_id: Uuid) -> Result<PublicUserRecord, AuthError> {
        self.store
            .find_by_id(user_id)
            .await?
            .ok_or(AuthError::NotFound)
    }
}
