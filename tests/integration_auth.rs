use anyhow::Result;
use argon2::Params;
use authgate::{
    api::{
        self,
        handlers::auth::{AuthConfig, AuthService, AuthState, PasswordHasher, TokenIssuer},
    },
    store::{CredentialStore, MemoryStore},
};
use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE, COOKIE, SET_COOKIE},
        HeaderValue, Request, StatusCode,
    },
    response::Response,
    Router,
};
use http_body_util::BodyExt;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::SecretString;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tower::ServiceExt;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret-0123456789abcdef";

fn fast_hasher() -> Result<PasswordHasher> {
    PasswordHasher::new(Params::MIN_M_COST * 8, 1)
}

fn app_with(store: Arc<MemoryStore>, ttl_seconds: i64) -> Result<(Router, Arc<AuthState>)> {
    let tokens = TokenIssuer::new(&SecretString::from(SECRET.to_string()), ttl_seconds)?;
    let service = AuthService::new(store, fast_hasher()?, tokens)?;
    let state = Arc::new(AuthState::new(AuthConfig::new(), service));
    let router = api::router(
        state.clone(),
        HeaderValue::from_static("http://localhost:5173"),
    );
    Ok((router, state))
}

fn app() -> Result<(Router, Arc<AuthState>, Arc<MemoryStore>)> {
    let store = Arc::new(MemoryStore::new());
    let (router, state) = app_with(store.clone(), 86_400)?;
    Ok((router, state, store))
}

fn post_json(uri: &str, body: &Value) -> Result<Request<Body>> {
    Ok(Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?)
}

fn get_with_cookie(uri: &str, token: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("token={token}"));
    }
    Ok(builder.body(Body::empty())?)
}

async fn json_body(response: Response) -> Result<Value> {
    let bytes = response.into_body().collect().await?.to_bytes();
    Ok(serde_json::from_slice(&bytes)?)
}

fn set_cookie(response: &Response) -> String {
    response
        .headers()
        .get(SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Pull the token value out of a `Set-Cookie` header.
fn cookie_token(set_cookie: &str) -> Option<String> {
    set_cookie
        .split(';')
        .next()?
        .strip_prefix("token=")
        .map(str::to_string)
}

async fn register(router: &Router, identity: &str, password: &str) -> Result<Response> {
    let request = post_json(
        "/auth/register",
        &json!({ "identity": identity, "password": password }),
    )?;
    Ok(router.clone().oneshot(request).await?)
}

async fn login(router: &Router, identity: &str, password: &str) -> Result<Response> {
    let request = post_json(
        "/auth/login",
        &json!({ "identity": identity, "password": password }),
    )?;
    Ok(router.clone().oneshot(request).await?)
}

#[tokio::test]
async fn full_session_lifecycle() -> Result<()> {
    let (router, _, _) = app()?;

    let response = register(&router, "alice", "secret1").await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        json_body(response).await?["message"],
        "User registered successfully"
    );

    let response = login(&router, "alice", "secret1").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Path=/"));
    assert!(cookie.contains("Max-Age=86400"));
    let token = cookie_token(&cookie).unwrap_or_default();
    assert!(!token.is_empty());

    let response = router
        .clone()
        .oneshot(get_with_cookie("/api/profile", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await?;
    let user = &body["user"];
    assert_eq!(user["identity"], "alice");
    assert!(user["id"].as_str().is_some_and(|id| Uuid::parse_str(id).is_ok()));
    assert!(user["created_at"].as_str().is_some_and(|t| t.ends_with('Z')));
    assert!(user.get("password_hash").is_none());
    assert!(!body.to_string().contains("argon2"));

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .header(COOKIE, format!("token={token}"))
        .body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = set_cookie(&response);
    assert!(cleared.starts_with("token=;"));
    assert!(cleared.contains("Max-Age=0"));

    let response = router
        .clone()
        .oneshot(get_with_cookie("/api/profile", None)?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn register_reports_every_invalid_field() -> Result<()> {
    let (router, _, store) = app()?;

    let response = register(&router, " al ", "12345").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await?;
    let fields: Vec<_> = body["errors"]
        .as_array()
        .map(|errors| {
            errors
                .iter()
                .filter_map(|e| e["field"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    assert_eq!(fields, vec!["identity", "password"]);
    assert!(store.is_empty().await);

    Ok(())
}

#[tokio::test]
async fn register_duplicate_is_rejected() -> Result<()> {
    let (router, _, store) = app()?;

    assert_eq!(
        register(&router, "alice", "secret1").await?.status(),
        StatusCode::CREATED
    );
    let response = register(&router, "alice", "different1").await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await?["message"], "Identity already exists");
    assert_eq!(store.len().await, 1);

    Ok(())
}

#[tokio::test]
async fn missing_body_is_bad_request() -> Result<()> {
    let (router, _, _) = app()?;

    for uri in ["/auth/register", "/auth/login"] {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())?;
        let response = router.clone().oneshot(request).await?;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
    }

    Ok(())
}

#[tokio::test]
async fn login_failures_look_the_same() -> Result<()> {
    let (router, _, _) = app()?;
    register(&router, "alice", "secret1").await?;

    let wrong_password = login(&router, "alice", "not-it").await?;
    let unknown = login(&router, "nobody", "secret1").await?;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(SET_COOKIE).is_none());
    assert!(unknown.headers().get(SET_COOKIE).is_none());

    let a = json_body(wrong_password).await?;
    let b = json_body(unknown).await?;
    assert_eq!(a, b);
    assert_eq!(a["message"], "Invalid credentials");

    Ok(())
}

#[tokio::test]
async fn login_trims_identity() -> Result<()> {
    let (router, _, _) = app()?;
    register(&router, "  alice  ", "secret1").await?;

    let response = login(&router, "alice ", "secret1").await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn forged_token_is_unauthorized() -> Result<()> {
    let (router, state, _) = app()?;
    let id = Uuid::now_v7();
    let token = state.service().tokens().issue(id)?;

    // Swap the signature for one made with another key.
    let other = TokenIssuer::new(
        &SecretString::from("some-other-secret-0123456789abcdefgh".to_string()),
        86_400,
    )?;
    let foreign = other.issue(id)?;
    let forged = format!(
        "{}.{}",
        token.rsplit_once('.').map(|(head, _)| head).unwrap_or_default(),
        foreign.rsplit_once('.').map(|(_, sig)| sig).unwrap_or_default()
    );

    for bad in [forged.as_str(), foreign.as_str(), "garbage"] {
        let response = router
            .clone()
            .oneshot(get_with_cookie("/api/profile", Some(bad))?)
            .await?;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await?["message"], "Unauthorized");
    }

    Ok(())
}

#[tokio::test]
async fn cookie_max_age_matches_token_lifetime() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let (router, state) = app_with(store, 60)?;
    register(&router, "alice", "secret1").await?;

    let response = login(&router, "alice", "secret1").await?;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = set_cookie(&response);
    assert!(cookie.contains("Max-Age=60"), "{cookie}");
    assert!(!cookie.contains("Max-Age=86400"));
    assert_eq!(state.session_max_age_seconds(), 60);

    // exp - iat in the issued token equals the cookie lifetime.
    let token = cookie_token(&cookie).unwrap_or_default();
    let claims = jsonwebtoken::decode::<Value>(
        &token,
        &DecodingKey::from_secret(SECRET.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?
    .claims;
    let lifetime = claims["exp"].as_i64().unwrap_or_default()
        - claims["iat"].as_i64().unwrap_or_default();
    assert_eq!(lifetime, 60);

    Ok(())
}

#[tokio::test]
async fn expired_token_is_unauthorized() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let (router, _) = app_with(store, 1)?;
    register(&router, "alice", "secret1").await?;

    let response = login(&router, "alice", "secret1").await?;
    let token = cookie_token(&set_cookie(&response)).unwrap_or_default();

    tokio::time::sleep(Duration::from_millis(2_100)).await;

    let response = router
        .clone()
        .oneshot(get_with_cookie("/api/profile", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    Ok(())
}

#[tokio::test]
async fn bearer_header_is_accepted() -> Result<()> {
    let (router, _, _) = app()?;
    register(&router, "alice", "secret1").await?;
    let response = login(&router, "alice", "secret1").await?;
    let token = cookie_token(&set_cookie(&response)).unwrap_or_default();

    let request = Request::builder()
        .method("GET")
        .uri("/api/profile")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;
    assert_eq!(response.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn valid_token_for_missing_user_is_not_found() -> Result<()> {
    let (router, state, _) = app()?;
    let token = state.service().tokens().issue(Uuid::now_v7())?;

    let response = router
        .clone()
        .oneshot(get_with_cookie("/api/profile", Some(&token))?)
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await?["message"], "User not found");

    Ok(())
}

#[tokio::test]
async fn health_reports_store() -> Result<()> {
    let (router, _, store) = app()?;
    assert_eq!(store.kind(), "memory");

    let response = router
        .clone()
        .oneshot(get_with_cookie("/health", None)?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("X-App").is_some());
    assert!(response.headers().get("x-request-id").is_some());
    let body = json_body(response).await?;
    assert_eq!(body["name"], env!("CARGO_PKG_NAME"));
    assert_eq!(body["store"], "memory:ok");

    Ok(())
}

#[tokio::test]
async fn cors_allows_frontend_with_credentials() -> Result<()> {
    let (router, _, _) = app()?;

    let request = Request::builder()
        .method("OPTIONS")
        .uri("/auth/login")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "POST")
        .body(Body::empty())?;
    let response = router.clone().oneshot(request).await?;

    let headers = response.headers();
    assert_eq!(
        headers
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("http://localhost:5173")
    );
    assert_eq!(
        headers
            .get("access-control-allow-credentials")
            .and_then(|v| v.to_str().ok()),
        Some("true")
    );

    Ok(())
}
