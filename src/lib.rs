//! # authgate
//!
//! Username/password authentication with cookie-carried sessions.
//!
//! ## Sessions
//!
//! Passwords are stored as Argon2id PHC strings. A successful login issues an
//! HS256 token (`sub`, `iat`, `exp`) and sets it in the `token` cookie
//! (`HttpOnly`, `SameSite=Strict`, `Path=/`, `Max-Age` equal to the token
//! lifetime). Protected routes under `/api` verify that token without touching
//! the credential store.
//!
//! There is no server-side session table. Logout clears the cookie in the
//! browser; a copied token remains valid until it expires.
//!
//! ## Layout
//!
//! - [`store`]: credential storage (Postgres or in-memory).
//! - [`api`]: axum router, handlers, access guard and `OpenAPI` document.
//! - [`client`]: session view driven over HTTP.
//! - [`cli`]: argument parsing, telemetry and server startup.

pub mod api;
pub mod cli;
pub mod client;
pub mod store;
