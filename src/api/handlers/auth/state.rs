use super::service::AuthService;

/// Cookie settings. The cookie lifetime is not set here; it is always the
/// token issuer's TTL (see [`AuthState::session_max_age_seconds`]).
#[derive(Clone, Debug)]
pub struct AuthConfig {
    session_cookie_secure: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session_cookie_secure: false,
        }
    }

    #[must_use]
    pub fn with_session_cookie_secure(mut self, secure: bool) -> Self {
        self.session_cookie_secure = secure;
        self
    }

    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.session_cookie_secure
    }
}

/// Shared auth state, injected into handlers as `Extension<Arc<AuthState>>`.
#[derive(Debug)]
pub struct AuthState {
    config: AuthConfig,
    service: AuthService,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, service: AuthService) -> Self {
        Self { config, service }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn service(&self) -> &AuthService {
        &self.service
    }

    /// Cookie `Max-Age`, equal to the lifetime of the tokens it carries.
    #[must_use]
    pub fn session_max_age_seconds(&self) -> i64 {
        self.service.tokens().ttl_seconds()
    }
}
