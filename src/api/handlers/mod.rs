pub mod auth;

pub mod health;
pub use self::health::health;

pub mod profile;
pub use self::profile::profile;

// axum handler for /
pub async fn root() -> &'static str {
    env!("CARGO_PKG_NAME")
}
