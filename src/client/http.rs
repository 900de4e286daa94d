//! HTTP backend for the session view.
//!
//! A `reqwest` client with a cookie store plays the browser: the session
//! cookie set by `/auth/login` is replayed on later requests and dropped again
//! when `/auth/logout` expires it. The token itself is never read here.

use crate::{
    api::{
        handlers::auth::types::{
            Credentials, MessageResponse, ProfileResponse, ValidationErrorResponse,
        },
        APP_USER_AGENT,
    },
    store::PublicUserRecord,
};
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use url::Url;

use super::AuthBackend;

/// Default request timeout applied to every call.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
/// Maximum number of error body characters surfaced to the view.
const MAX_ERROR_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{message}")]
    Http { status: u16, message: String },
}

impl ClientError {
    /// HTTP status of a rejected request, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::Config(_) | Self::Network(_) => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct HttpAuthBackend {
    client: Client,
    base_url: Url,
}

impl HttpAuthBackend {
    /// # Errors
    /// Returns an error if the base URL is invalid or the client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|e| ClientError::Config(format!("{base_url}: {e}")))?;
        let client = Client::builder()
            .user_agent(APP_USER_AGENT)
            .cookie_store(true)
            .timeout(DEFAULT_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url })
    }

    fn url(&self, path: &str) -> Result<Url, ClientError> {
        self.base_url
            .join(path)
            .map_err(|e| ClientError::Config(format!("{path}: {e}")))
    }

    async fn post_credentials(
        &self,
        path: &str,
        identity: &str,
        password: &str,
    ) -> Result<Response, ClientError> {
        let body = Credentials {
            identity: identity.to_string(),
            password: password.to_string(),
        };
        Ok(self.client.post(self.url(path)?).json(&body).send().await?)
    }
}

/// Turn a non-success response into a `ClientError::Http` with a readable
/// message: the server's `message`, its joined field errors, or the raw body.
async fn error_from_response(response: Response) -> ClientError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    let message = if let Ok(parsed) = serde_json::from_str::<ValidationErrorResponse>(&body) {
        parsed
            .errors
            .into_iter()
            .map(|e| e.message)
            .collect::<Vec<_>>()
            .join("; ")
    } else if let Ok(parsed) = serde_json::from_str::<MessageResponse>(&body) {
        parsed.message
    } else {
        body.chars().take(MAX_ERROR_CHARS).collect()
    };

    let message = if message.trim().is_empty() {
        format!("Request failed with status {status}")
    } else {
        message
    };

    ClientError::Http { status, message }
}

#[async_trait]
impl AuthBackend for HttpAuthBackend {
    type Error = ClientError;

    #[instrument(skip(self, password))]
    async fn register(&self, identity: &str, password: &str) -> Result<String, ClientError> {
        let response = self
            .post_credentials("/auth/register", identity, password)
            .await?;
        if response.status() != StatusCode::CREATED {
            return Err(error_from_response(response).await);
        }
        Ok(response.json::<MessageResponse>().await?.message)
    }

    #[instrument(skip(self, password))]
    async fn login(&self, identity: &str, password: &str) -> Result<(), ClientError> {
        let response = self
            .post_credentials("/auth/login", identity, password)
            .await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        debug!("login accepted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn logout(&self) -> Result<(), ClientError> {
        let response = self.client.post(self.url("/auth/logout")?).send().await?;
        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn profile(&self) -> Result<Option<PublicUserRecord>, ClientError> {
        let response = self.client.get(self.url("/api/profile")?).send().await?;
        match response.status() {
            StatusCode::OK => Ok(Some(response.json::<ProfileResponse>().await?.user)),
            // A vanished account looks the same as no session to the view.
            StatusCode::UNAUTHORIZED | StatusCode::NOT_FOUND => Ok(None),
            _ => {
                let err = error_from_response(response).await;
                warn!(status = err.status(), "profile lookup failed: {err}");
                Err(err)
            }
        }
    }
}
