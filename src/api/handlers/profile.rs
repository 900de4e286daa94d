use axum::{extract::Extension, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::instrument;

use super::auth::{
    types::{MessageResponse, ProfileResponse},
    AuthError, AuthState, AuthenticatedUser,
};

#[utoipa::path(
    get,
    path = "/api/profile",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = ProfileResponse),
        (status = 401, description = "Missing, invalid or expired session cookie", body = MessageResponse),
        (status = 404, description = "User no longer exists", body = MessageResponse),
    ),
    tag = "profile"
)]
#[instrument(skip(auth_state))]
pub async fn profile(
    auth_state: Extension<Arc<AuthState>>,
    user: Extension<AuthenticatedUser>,
) -> Result<impl IntoResponse, AuthError> {
    let user = auth_state.service().profile(user.user_id).await?;

    Ok(Json(ProfileResponse { user }))
}
