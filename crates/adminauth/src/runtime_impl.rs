use std::sync::Mutex;
use std::time::Duration;

use adminauth_core::auth::decode_payload;
use adminauth_core::config::TokenRequest;
use adminauth_core::runtime::{
    AuthorizationRequest, HttpClient, HttpResponse, IdTokenClaims, IdentityProvider, Navigator,
    Notifier,
};
use adminauth_core::SessionError;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{info, warn};

/// Native HTTP client using reqwest
#[derive(Clone)]
pub struct NativeHttpClient {
    client: reqwest::Client,
}

impl NativeHttpClient {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .build()?,
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<HttpResponse, SessionError> {
        let response = request
            .send()
            .await
            .map_err(|e| SessionError::Http(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SessionError::Http(e.to_string()))?;
        Ok(HttpResponse { status, body })
    }
}

#[async_trait]
impl HttpClient for NativeHttpClient {
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, SessionError> {
        let mut request = self.client.get(url);
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }

    async fn post(
        &self,
        url: &str,
        body: &str,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, SessionError> {
        let mut request = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_owned());
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        self.send(request).await
    }
}

/// Identity provider backed by tokens given on the command line.
/// Redirect logins print the authorize URL instead of opening a browser.
pub struct StaticProvider {
    domain: String,
    client_id: String,
    id_token: Option<String>,
    access_token: Option<String>,
}

impl StaticProvider {
    pub fn new(
        domain: &str,
        client_id: &str,
        id_token: Option<String>,
        access_token: Option<String>,
    ) -> Self {
        Self {
            domain: domain.to_string(),
            client_id: client_id.to_string(),
            id_token,
            access_token,
        }
    }

    pub fn authorize_url(&self, request: &AuthorizationRequest) -> Result<reqwest::Url, SessionError> {
        let mut params = vec![
            ("response_type", "code".to_string()),
            ("client_id", self.client_id.clone()),
            ("redirect_uri", request.redirect_uri.clone()),
            ("scope", request.scope.clone()),
        ];
        if let Some(audience) = &request.audience {
            params.push(("audience", audience.clone()));
        }
        if let Some(hint) = &request.login_hint {
            params.push(("login_hint", hint.clone()));
        }

        reqwest::Url::parse_with_params(&format!("https://{}/authorize", self.domain), &params)
            .map_err(|e| SessionError::Config(format!("Invalid provider domain: {}", e)))
    }
}

#[async_trait]
impl IdentityProvider for StaticProvider {
    async fn id_token_claims(&self) -> Result<Option<IdTokenClaims>, SessionError> {
        Ok(self.id_token.as_ref().map(|raw| IdTokenClaims {
            claims: decode_payload(Some(raw)).unwrap_or_default(),
            raw: Some(raw.clone()),
        }))
    }

    async fn access_token(&self, request: &TokenRequest) -> Result<String, SessionError> {
        self.access_token.clone().ok_or_else(|| {
            SessionError::Provider(format!(
                "no access token supplied for scope '{}'",
                request.scope
            ))
        })
    }

    async fn login_with_redirect(&self, request: AuthorizationRequest) -> Result<(), SessionError> {
        let url = self.authorize_url(&request)?;
        println!("{}", url);
        Ok(())
    }

    async fn logout(&self, return_to: &str) -> Result<(), SessionError> {
        info!(return_to = %return_to, "Provider logout requested");
        Ok(())
    }
}

/// Navigator that only tracks and logs the current path
pub struct ConsoleNavigator {
    path: Mutex<String>,
}

impl ConsoleNavigator {
    pub fn new(path: &str) -> Self {
        Self {
            path: Mutex::new(path.to_string()),
        }
    }
}

impl Navigator for ConsoleNavigator {
    fn current_path(&self) -> String {
        self.path.lock().map(|p| p.clone()).unwrap_or_default()
    }

    fn navigate(&self, path: &str, replace: bool) {
        info!(path = %path, replace = replace, "Navigating");
        if let Ok(mut current) = self.path.lock() {
            *current = path.to_string();
        }
    }
}

/// Tracing-based notifier for native
#[derive(Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn alert(&self, message: &str) {
        warn!("{}", message);
    }
}
