use tracing::{error, info, warn};

use super::validation::validate_credentials;
use crate::client::{BackendClient, Credentials};
use crate::config::AuthConfig;
use crate::error::{AuthError, SessionError};
use crate::runtime::{AuthorizationRequest, HttpClient, IdentityProvider, KeyValueStore, Navigator, Notifier};
use crate::session::{Session, SessionSynchronizer};
use crate::{DASHBOARD_PATH, LOGIN_PATH};

/// Authorization request for a provider redirect login
pub fn authorization_request(config: &AuthConfig, login_hint: Option<&str>) -> AuthorizationRequest {
    AuthorizationRequest {
        redirect_uri: config.origin.clone(),
        scope: config.login_scope(),
        audience: config.audience.clone(),
        login_hint: login_hint
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string),
    }
}

/// Start a provider redirect login. Failures are logged, never returned:
/// the provider owns the redirect from here on.
pub async fn login_with_redirect<P: IdentityProvider>(
    provider: &P,
    config: &AuthConfig,
    login_hint: Option<&str>,
) {
    let request = authorization_request(config, login_hint);
    if let Err(e) = provider.login_with_redirect(request).await {
        error!(error = %e, "Could not start identity provider login");
    }
}

/// Login operations bound to a synchronizer and a backend client
pub struct LoginFlow<'a, P, N, A, H, S>
where
    P: IdentityProvider,
    N: Navigator,
    A: Notifier,
    H: HttpClient,
    S: KeyValueStore,
{
    sync: &'a SessionSynchronizer<P, N, A>,
    backend: &'a BackendClient<H, S>,
}

impl<'a, P, N, A, H, S> LoginFlow<'a, P, N, A, H, S>
where
    P: IdentityProvider,
    N: Navigator,
    A: Notifier,
    H: HttpClient,
    S: KeyValueStore,
{
    pub fn new(sync: &'a SessionSynchronizer<P, N, A>, backend: &'a BackendClient<H, S>) -> Self {
        Self { sync, backend }
    }

    pub async fn login_with_redirect(&self, email: Option<&str>) {
        login_with_redirect(self.sync.provider(), self.sync.config(), email).await
    }

    /// Where to send the browser for a backend-mediated Okta login
    pub fn okta_login_url(&self) -> String {
        self.backend.okta_login_url()
    }

    /// Validate the form, then log in through the backend. Validation
    /// failures never reach the network.
    pub async fn login_with_credentials(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, SessionError> {
        validate_credentials(email, password).map_err(AuthError::Validation)?;

        let credentials = Credentials {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let login = self.backend.login(&credentials).await?;

        let session = self.admit(&login.user)?;
        self.sync.navigator().navigate(DASHBOARD_PATH, true);
        Ok(session)
    }

    /// Exchange the one-time code received at the callback location.
    /// Success lands on the dashboard, any failure on the login view.
    pub async fn handle_callback(&self, code: &str) -> Result<Session, SessionError> {
        let result = match code.trim() {
            "" => Err(AuthError::InvalidToken.into()),
            code => match self.backend.okta_callback(code).await {
                Ok(login) => self.admit(&login.user).map_err(SessionError::from),
                Err(e) => Err(e),
            },
        };

        match &result {
            Ok(session) => {
                info!(subject = %session.subject_id, "OAuth callback exchanged");
                self.sync.navigator().navigate(DASHBOARD_PATH, true);
            }
            Err(e) => {
                warn!(error = %e, "OAuth callback exchange failed");
                self.sync.navigator().navigate(LOGIN_PATH, true);
            }
        }
        result
    }

    /// End both the backend and the provider session
    pub async fn logout(&self) {
        self.backend.logout().await;
        self.sync.logout().await;
    }

    fn admit(&self, user: &crate::client::BackendUser) -> Result<Session, AuthError> {
        self.sync.admit_backend_user(user).map_err(|e| {
            // A non-admin must not keep a usable backend token around
            self.backend.clear_persisted();
            e
        })
    }
}
