use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use tracing::instrument;

use super::{
    error::AuthError,
    session::session_cookie,
    state::AuthState,
    types::{Credentials, MessageResponse},
};

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = Credentials,
    responses(
        (status = 200, description = "Login successful, session cookie set", body = MessageResponse),
        (status = 401, description = "Invalid credentials", body = MessageResponse),
        (status = 500, description = "Unexpected failure", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state))]
pub async fn login(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<Credentials>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(credentials)) = payload else {
        return Err(AuthError::BadRequest);
    };

    let token = auth_state
        .service()
        .login(&credentials.identity, &credentials.password)
        .await?;

    let cookie = session_cookie(
        auth_state.config(),
        &token,
        auth_state.session_max_age_seconds(),
    )
    .map_err(|e| AuthError::Internal(anyhow::anyhow!("failed to build session cookie: {e}")))?;

    let mut headers = HeaderMap::new();
    headers.insert(SET_COOKIE, cookie);

    Ok((headers, Json(MessageResponse::new("Login successful"))))
}
