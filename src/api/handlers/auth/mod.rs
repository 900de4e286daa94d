//! Auth handlers and supporting modules.
//!
//! Registration stores an Argon2id hash; login issues an HS256 token carried
//! in the `token` cookie; the guard verifies that token on protected routes.
//! There is no server-side session table, so logout only clears the cookie.

mod error;
pub mod guard;
mod login;
mod logout;
pub mod password;
mod register;
pub mod service;
pub mod session;
mod state;
pub mod token;
pub mod types;

pub use error::AuthError;
pub use guard::{require_session, AuthenticatedUser};
pub use login::{__path_login, login};
pub use logout::{__path_logout, logout};
pub use password::PasswordHasher;
pub use register::{__path_register, register};
pub use service::AuthService;
pub use state::{AuthConfig, AuthState};
pub use token::{TokenError, TokenIssuer};
