use crate::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthService, AuthState, PasswordHasher, TokenIssuer},
    },
    cli::telemetry,
    store::{CredentialStore, MemoryStore, PgStore},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use sqlx::postgres::PgPoolOptions;
use std::{sync::Arc, time::Duration};
use tracing::{info, warn};

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    /// `None` selects the in-memory store.
    pub dsn: Option<String>,
    pub migrate: bool,
    pub token_secret: SecretString,
    pub session_ttl_seconds: i64,
    pub cookie_secure: bool,
    pub frontend_origin: String,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

async fn connect_store(dsn: Option<&str>, migrate: bool) -> Result<Arc<dyn CredentialStore>> {
    let Some(dsn) = dsn else {
        warn!("using in-memory store, users are lost on restart");
        return Ok(Arc::new(MemoryStore::new()));
    };

    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(dsn)
        .await
        .context("Failed to connect to database")?;

    let store = PgStore::new(pool);

    if migrate {
        store.migrate().await.context("Failed to apply schema")?;
        info!("schema applied");
    }

    Ok(Arc::new(store))
}

/// Execute the server action.
/// # Errors
/// Returns an error if the store, hasher or token issuer cannot be set up, or
/// the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let store = connect_store(args.dsn.as_deref(), args.migrate).await?;

    let hasher = PasswordHasher::new(args.argon2_memory_kib, args.argon2_iterations)
        .context("Invalid Argon2 parameters")?;
    let tokens = TokenIssuer::new(&args.token_secret, args.session_ttl_seconds)?;
    let service = AuthService::new(store, hasher, tokens)?;

    let auth_config = AuthConfig::new().with_session_cookie_secure(args.cookie_secure);
    if !args.cookie_secure {
        warn!("session cookie is not marked Secure");
    }

    let auth_state = Arc::new(AuthState::new(auth_config, service));
    let frontend_origin = api::frontend_origin(&args.frontend_origin)?;

    let result = api::new(args.port, auth_state, frontend_origin).await;

    telemetry::shutdown_tracer();

    result
}
