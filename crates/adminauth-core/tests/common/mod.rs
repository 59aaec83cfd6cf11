// In-memory fakes of the host boundary traits
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use adminauth_core::auth::token::encode_unsigned;
use adminauth_core::auth::ClaimSet;
use adminauth_core::config::{AuthConfig, TokenRequest};
use adminauth_core::runtime::{
    AuthorizationRequest, HttpClient, HttpResponse, IdTokenClaims, IdentityProvider, Navigator,
    Notifier,
};
use adminauth_core::{SessionError, UserProfile};
use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Notify;

pub fn claims(value: Value) -> ClaimSet {
    value.as_object().cloned().expect("claims must be a JSON object")
}

pub fn token(value: Value) -> String {
    encode_unsigned(&claims(value))
}

pub fn config() -> AuthConfig {
    AuthConfig {
        domain: "tenant.auth0.com".to_string(),
        client_id: "client-123".to_string(),
        audience: Some("https://api.panel".to_string()),
        login_scope: None,
        api_scope: Some("read write".to_string()),
        admin_role: "admin".to_string(),
        roles_claim: None,
        api_url: "http://backend.test/api".to_string(),
        origin: "http://panel.test".to_string(),
    }
}

pub fn user(sub: &str) -> UserProfile {
    UserProfile {
        sub: sub.to_string(),
        name: Some("Ada Lovelace".to_string()),
        nickname: None,
        email: Some("ada@example.com".to_string()),
    }
}

pub struct FakeProvider {
    id_token: Mutex<Option<IdTokenClaims>>,
    access_token: Mutex<Result<String, String>>,
    login_error: Mutex<Option<String>>,
    gate: Mutex<Option<Arc<Notify>>>,
    logout_gate: Mutex<Option<Arc<Notify>>>,
    pub logouts: AtomicUsize,
    pub token_requests: Mutex<Vec<TokenRequest>>,
    pub redirects: Mutex<Vec<AuthorizationRequest>>,
}

impl FakeProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id_token: Mutex::new(None),
            access_token: Mutex::new(Ok(String::new())),
            login_error: Mutex::new(None),
            gate: Mutex::new(None),
            logout_gate: Mutex::new(None),
            logouts: AtomicUsize::new(0),
            token_requests: Mutex::new(Vec::new()),
            redirects: Mutex::new(Vec::new()),
        })
    }

    pub fn set_access_token(&self, token: String) {
        *self.access_token.lock().unwrap() = Ok(token);
    }

    pub fn fail_access_token(&self, message: &str) {
        *self.access_token.lock().unwrap() = Err(message.to_string());
    }

    pub fn set_id_token(&self, claims: ClaimSet, raw: Option<String>) {
        *self.id_token.lock().unwrap() = Some(IdTokenClaims { claims, raw });
    }

    pub fn fail_login(&self, message: &str) {
        *self.login_error.lock().unwrap() = Some(message.to_string());
    }

    /// Hold `access_token` calls until the returned handle is notified
    pub fn gate(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    /// Hold `logout` calls until the returned handle is notified
    pub fn gate_logout(&self) -> Arc<Notify> {
        let notify = Arc::new(Notify::new());
        *self.logout_gate.lock().unwrap() = Some(notify.clone());
        notify
    }

    pub fn logout_count(&self) -> usize {
        self.logouts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeProvider {
    async fn id_token_claims(&self) -> Result<Option<IdTokenClaims>, SessionError> {
        Ok(self.id_token.lock().unwrap().clone())
    }

    async fn access_token(&self, request: &TokenRequest) -> Result<String, SessionError> {
        self.token_requests.lock().unwrap().push(request.clone());
        let gate = self.gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.access_token
            .lock()
            .unwrap()
            .clone()
            .map_err(SessionError::Provider)
    }

    async fn login_with_redirect(&self, request: AuthorizationRequest) -> Result<(), SessionError> {
        self.redirects.lock().unwrap().push(request);
        match self.login_error.lock().unwrap().clone() {
            Some(message) => Err(SessionError::Provider(message)),
            None => Ok(()),
        }
    }

    async fn logout(&self, _return_to: &str) -> Result<(), SessionError> {
        self.logouts.fetch_add(1, Ordering::SeqCst);
        let gate = self.logout_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(())
    }
}

pub struct FakeNavigator {
    path: Mutex<String>,
    pub history: Mutex<Vec<String>>,
}

impl FakeNavigator {
    pub fn at(path: &str) -> Arc<Self> {
        Arc::new(Self {
            path: Mutex::new(path.to_string()),
            history: Mutex::new(Vec::new()),
        })
    }

    pub fn path(&self) -> String {
        self.path.lock().unwrap().clone()
    }

    pub fn set_path(&self, path: &str) {
        *self.path.lock().unwrap() = path.to_string();
    }

    pub fn visits(&self) -> Vec<String> {
        self.history.lock().unwrap().clone()
    }
}

impl Navigator for FakeNavigator {
    fn current_path(&self) -> String {
        self.path()
    }

    fn navigate(&self, path: &str, _replace: bool) {
        self.set_path(path);
        self.history.lock().unwrap().push(path.to_string());
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub alerts: Mutex<Vec<String>>,
}

impl FakeNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn messages(&self) -> Vec<String> {
        self.alerts.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    fn alert(&self, message: &str) {
        self.alerts.lock().unwrap().push(message.to_string());
    }
}

/// A request seen by [`FakeHttp`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recorded {
    pub method: &'static str,
    pub url: String,
    pub body: Option<String>,
    pub bearer: Option<String>,
}

#[derive(Default)]
pub struct FakeHttp {
    responses: Mutex<HashMap<String, HttpResponse>>,
    pub requests: Mutex<Vec<Recorded>>,
}

impl FakeHttp {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, method: &str, url: &str, status: u16, body: Value) {
        self.responses.lock().unwrap().insert(
            format!("{} {}", method, url),
            HttpResponse {
                status,
                body: body.to_string(),
            },
        );
    }

    pub fn recorded(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn answer(&self, method: &str, url: &str) -> Result<HttpResponse, SessionError> {
        self.responses
            .lock()
            .unwrap()
            .get(&format!("{} {}", method, url))
            .cloned()
            .ok_or_else(|| SessionError::Http(format!("connection refused: {}", url)))
    }
}

#[async_trait]
impl HttpClient for FakeHttp {
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, SessionError> {
        self.requests.lock().unwrap().push(Recorded {
            method: "GET",
            url: url.to_string(),
            body: None,
            bearer: bearer.map(str::to_string),
        });
        self.answer("GET", url)
    }

    async fn post(
        &self,
        url: &str,
        body: &str,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, SessionError> {
        self.requests.lock().unwrap().push(Recorded {
            method: "POST",
            url: url.to_string(),
            body: Some(body.to_string()),
            bearer: bearer.map(str::to_string),
        });
        self.answer("POST", url)
    }
}
