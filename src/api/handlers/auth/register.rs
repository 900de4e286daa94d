use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::instrument;

use super::{
    error::AuthError,
    state::AuthState,
    types::{Credentials, MessageResponse, ValidationErrorResponse},
};

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = Credentials,
    responses(
        (status = 201, description = "Registration successful", body = MessageResponse),
        (status = 400, description = "Invalid fields, or the identity is already taken", body = ValidationErrorResponse),
        (status = 500, description = "Unexpected failure", body = MessageResponse),
    ),
    tag = "auth"
)]
#[instrument(skip(auth_state))]
pub async fn register(
    auth_state: Extension<Arc<AuthState>>,
    payload: Option<Json<Credentials>>,
) -> Result<impl IntoResponse, AuthError> {
    let Some(Json(credentials)) = payload else {
        return Err(AuthError::BadRequest);
    };

    auth_state
        .service()
        .register(&credentials.identity, &credentials.password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User registered successfully")),
    ))
}
