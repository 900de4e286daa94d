//! Error kinds surfaced by the auth endpoints and how they map to HTTP.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;
use tracing::error;

use super::types::{FieldError, MessageResponse, ValidationErrorResponse};
use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("missing or malformed payload")]
    BadRequest,
    #[error("identity already exists")]
    DuplicateIdentity,
    /// Same outcome for unknown identity and wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("user not found")]
    NotFound,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentity => Self::DuplicateIdentity,
            StoreError::Backend(e) => Self::Internal(e),
        }
    }
}

impl AuthError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) | Self::BadRequest | Self::DuplicateIdentity => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidCredentials | Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            Self::Validation(errors) => {
                return (status, Json(ValidationErrorResponse { errors })).into_response();
            }
            Self::BadRequest => "Missing payload",
            Self::DuplicateIdentity => "Identity already exists",
            Self::InvalidCredentials => "Invalid credentials",
            Self::Unauthenticated => "Unauthorized",
            Self::NotFound => "User not found",
            Self::Internal(e) => {
                // Details stay in the logs.
                error!("Internal error: {e:?}");
                "Server error"
            }
        };

        (status, Json(MessageResponse::new(message))).into_response()
    }
}
