use std::fmt::Write as _;
use tokio::sync::watch;
use tracing::{debug, warn};

use super::AuthBackend;
use crate::store::PublicUserRecord;

/// What the login form shows besides its inputs.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub identity: String,
    pub error: Option<String>,
    pub notice: Option<String>,
}

impl LoginForm {
    fn with_error(identity: &str, error: impl ToString) -> Self {
        Self {
            identity: identity.trim().to_string(),
            error: Some(error.to_string()),
            notice: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Unauthenticated { form: LoginForm },
    Authenticated { user: PublicUserRecord },
}

impl SessionState {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::Unauthenticated {
            form: LoginForm::default(),
        }
    }

    #[must_use]
    pub fn user(&self) -> Option<&PublicUserRecord> {
        match self {
            Self::Authenticated { user } => Some(user),
            _ => None,
        }
    }

    /// Plain-text rendering of the current screen.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        match self {
            Self::Loading => out.push_str("Loading..."),
            Self::Unauthenticated { form } => {
                out.push_str("Please log in\n");
                let _ = writeln!(out, "Identity: {}", form.identity);
                out.push_str("Password: ");
                if let Some(notice) = &form.notice {
                    let _ = write!(out, "\n{notice}");
                }
                if let Some(error) = &form.error {
                    let _ = write!(out, "\nError: {error}");
                }
                out.push_str("\n[Login] [Register]");
            }
            Self::Authenticated { user } => {
                let _ = write!(out, "Welcome, {}!\n[Logout]", user.identity);
            }
        }
        out
    }
}

/// Session state holder. Starts in `Loading` until [`SessionView::hydrate`].
pub struct SessionView<B> {
    backend: B,
    state: watch::Sender<SessionState>,
}

impl<B: AuthBackend> SessionView<B> {
    pub fn new(backend: B) -> Self {
        let (state, _) = watch::channel(SessionState::Loading);
        Self { backend, state }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    fn set(&self, next: SessionState) {
        // `send_replace` publishes even while nobody is subscribed.
        self.state.send_replace(next);
    }

    /// Ask the server for an existing session.
    pub async fn hydrate(&self) {
        self.set(SessionState::Loading);
        let next = match self.backend.profile().await {
            Ok(Some(user)) => SessionState::Authenticated { user },
            Ok(None) => SessionState::anonymous(),
            Err(err) => {
                warn!("session lookup failed: {err}");
                SessionState::anonymous()
            }
        };
        self.set(next);
    }

    /// Log in and load the profile. Returns whether the view is now
    /// authenticated.
    pub async fn login(&self, identity: &str, password: &str) -> bool {
        if let Err(err) = self.backend.login(identity, password).await {
            debug!("login rejected: {err}");
            self.set(SessionState::Unauthenticated {
                form: LoginForm::with_error(identity, err),
            });
            return false;
        }

        match self.backend.profile().await {
            Ok(Some(user)) => {
                self.set(SessionState::Authenticated { user });
                true
            }
            Ok(None) => {
                self.set(SessionState::Unauthenticated {
                    form: LoginForm::with_error(identity, "Session was not established"),
                });
                false
            }
            Err(err) => {
                self.set(SessionState::Unauthenticated {
                    form: LoginForm::with_error(identity, err),
                });
                false
            }
        }
    }

    /// Register without logging in; the outcome lands on the form.
    pub async fn register(&self, identity: &str, password: &str) {
        let form = match self.backend.register(identity, password).await {
            Ok(message) => LoginForm {
                identity: identity.trim().to_string(),
                error: None,
                notice: Some(message),
            },
            Err(err) => LoginForm::with_error(identity, err),
        };
        self.set(SessionState::Unauthenticated { form });
    }

    /// Drop the session. The view returns to the login form even when the
    /// server call fails, since the cookie is the server's to clear.
    pub async fn logout(&self) {
        let form = match self.backend.logout().await {
            Ok(()) => LoginForm::default(),
            Err(err) => {
                warn!("logout failed: {err}");
                LoginForm {
                    error: Some(err.to_string()),
                    ..LoginForm::default()
                }
            }
        };
        self.set(SessionState::Unauthenticated { form });
    }
}
