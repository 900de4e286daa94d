//! Access guard for protected routes.
//!
//! Reads the session token, verifies it, and attaches the resolved user to
//! the request. It never consults the credential store; a token for a deleted
//! user passes here and the handler answers 404.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{error::AuthError, session::extract_session_token, state::AuthState, token::TokenError};

/// Authenticated user context inserted into request extensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
}

/// Verify a raw request's headers and resolve the user.
///
/// # Errors
/// `Unauthenticated` when the token is missing, forged, or expired.
pub fn authenticate(
    headers: &axum::http::HeaderMap,
    auth_state: &AuthState,
) -> Result<AuthenticatedUser, AuthError> {
    let Some(token) = extract_session_token(headers) else {
        debug!("no session token");
        return Err(AuthError::Unauthenticated);
    };

    match auth_state.service().tokens().verify(&token) {
        Ok(user_id) => Ok(AuthenticatedUser { user_id }),
        Err(TokenError::Expired) => {
            debug!("session token expired");
            Err(AuthError::Unauthenticated)
        }
        Err(TokenError::Invalid) => {
            warn!("invalid session token");
            Err(AuthError::Unauthenticated)
        }
    }
}

/// axum middleware: reject with 401 or continue with [`AuthenticatedUser`]
/// in the request extensions.
///
/// # Errors
/// Returns `AuthError::Unauthenticated` as the response.
pub async fn require_session(
    State(auth_state): State<Arc<AuthState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = authenticate(request.headers(), &auth_state)?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
