//! Map validated CLI matches to an action.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{auth, ARG_DSN, ARG_MEMORY_STORE, ARG_MIGRATE, ARG_PORT};
use anyhow::{Context, Result};

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>(ARG_PORT).copied().unwrap_or(8080);
    let memory_store = matches.get_flag(ARG_MEMORY_STORE);

    let dsn = if memory_store {
        None
    } else {
        Some(
            matches
                .get_one::<String>(ARG_DSN)
                .cloned()
                .filter(|v| !v.trim().is_empty())
                .context("missing required argument: --dsn")?,
        )
    };

    let auth_opts = auth::Options::parse(matches)?;

    Ok(Action::Server(Args {
        port,
        dsn,
        migrate: matches.get_flag(ARG_MIGRATE),
        token_secret: auth_opts.token_secret,
        session_ttl_seconds: auth_opts.session_ttl_seconds,
        cookie_secure: auth_opts.cookie_secure,
        frontend_origin: auth_opts.frontend_origin,
        argon2_memory_kib: auth_opts.argon2_memory_kib,
        argon2_iterations: auth_opts.argon2_iterations,
    }))
}
