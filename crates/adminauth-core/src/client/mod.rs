//! Backend API client
//!
//! Wraps the backend auth endpoints, attaches bearer tokens to outgoing
//! requests, persists the backend session token and user record, and clears
//! them on logout or any 401 response.

pub mod interceptor;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::auth::ClaimSet;
use crate::error::{AuthError, SessionError};
use crate::runtime::{HttpClient, HttpResponse, KeyValueStore, Navigator};
use crate::LOGIN_PATH;

pub use interceptor::{resolve_bearer, ProviderTokenResolver, TokenResolver};

/// Storage key of the backend session token
pub const TOKEN_KEY: &str = "token";
/// Storage key of the serialized backend user record
pub const USER_KEY: &str = "user";

/// User record returned by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendUser {
    #[serde(default, alias = "sub")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Response of the credential login and OAuth callback endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: BackendUser,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Decoded claim information the backend reports for the caller's token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDebugInfo {
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub trace_id: Option<String>,
    /// Redacted `Authorization` header as seen by the backend
    #[serde(default)]
    pub authorization_header: Option<String>,
    #[serde(default)]
    pub principal: Option<String>,
    #[serde(default)]
    pub authorities: Vec<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub audience: Vec<String>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub issued_at: Option<String>,
    #[serde(default)]
    pub claims: Option<ClaimSet>,
    #[serde(default)]
    pub error: Option<String>,
}

pub struct BackendClient<H: HttpClient, S: KeyValueStore> {
    http: H,
    store: S,
    base_url: String,
    resolver: Option<Arc<dyn TokenResolver>>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl<H: HttpClient, S: KeyValueStore> BackendClient<H, S> {
    pub fn new(http: H, store: S, base_url: impl Into<String>) -> Self {
        Self {
            http,
            store,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            resolver: None,
            navigator: None,
        }
    }

    /// Attach provider access tokens to every request
    pub fn with_token_resolver(mut self, resolver: Arc<dyn TokenResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    /// Router used to force the login view after a 401
    pub fn with_navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Where the browser goes to start a backend-mediated Okta login
    pub fn okta_login_url(&self) -> String {
        self.url("/auth/okta/login")
    }

    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, SessionError> {
        let body = serde_json::to_string(credentials)?;
        let response = self.post("/auth/login", &body).await?;
        self.establish(&response)
    }

    /// Exchange a one-time authorization code for a backend session
    pub async fn okta_callback(&self, code: &str) -> Result<LoginResponse, SessionError> {
        let body = serde_json::json!({ "code": code }).to_string();
        let response = self.post("/auth/okta/callback", &body).await?;
        self.establish(&response)
    }

    /// End the backend session. Local state is cleared even if the call fails.
    pub async fn logout(&self) {
        if let Err(e) = self.post("/auth/logout", "{}").await {
            error!(error = %e, "Backend logout failed");
        }
        self.clear_persisted();
    }

    pub async fn debug_token(&self) -> Result<TokenDebugInfo, SessionError> {
        let response = self.get("/debug/token").await?;
        Ok(serde_json::from_str(&response.body)?)
    }

    pub fn stored_token(&self) -> Option<String> {
        self.store.get(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    pub fn stored_user(&self) -> Option<BackendUser> {
        let raw = self.store.get(USER_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Ignoring unreadable stored user record");
                None
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.stored_token().is_some()
    }

    pub fn clear_persisted(&self) {
        self.store.remove(TOKEN_KEY);
        self.store.remove(USER_KEY);
    }

    pub async fn get(&self, path: &str) -> Result<HttpResponse, SessionError> {
        let bearer = self.bearer().await;
        let response = self.http.get(&self.url(path), bearer.as_deref()).await?;
        self.check(path, response)
    }

    pub async fn post(&self, path: &str, body: &str) -> Result<HttpResponse, SessionError> {
        let bearer = self.bearer().await;
        let response = self
            .http
            .post(&self.url(path), body, bearer.as_deref())
            .await?;
        self.check(path, response)
    }

    /// Provider token when a resolver is configured, else the stored
    /// backend session token
    async fn bearer(&self) -> Option<String> {
        match self.resolver.as_deref() {
            Some(resolver) => resolve_bearer(Some(resolver)).await,
            None => self.stored_token(),
        }
    }

    fn check(&self, path: &str, response: HttpResponse) -> Result<HttpResponse, SessionError> {
        if response.status == 401 {
            warn!(path = %path, "Backend rejected credentials, clearing local session");
            self.clear_persisted();
            if let Some(navigator) = &self.navigator {
                navigator.navigate(LOGIN_PATH, true);
            }
            return Err(AuthError::Unauthorized.into());
        }

        if !response.is_success() {
            return Err(SessionError::Http(format!(
                "{} returned status {}",
                path, response.status
            )));
        }

        debug!(path = %path, status = response.status, "Backend request completed");
        Ok(response)
    }

    fn establish(&self, response: &HttpResponse) -> Result<LoginResponse, SessionError> {
        let login: LoginResponse = serde_json::from_str(&response.body)?;
        self.store.set(TOKEN_KEY, &login.token)?;
        self.store.set(USER_KEY, &serde_json::to_string(&login.user)?)?;
        Ok(login)
    }
}
