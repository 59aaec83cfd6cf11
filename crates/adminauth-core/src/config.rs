//! Startup configuration
//!
//! Read once from the environment and immutable afterwards. Everything is a
//! plain string; a missing domain or client id is a startup warning, not an
//! error.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Environment keys read by [`AuthConfig::from_env`]
pub struct ConfigKeys;

impl ConfigKeys {
    // Identity provider
    pub const DOMAIN: &'static str = "ADMINAUTH_DOMAIN";
    pub const CLIENT_ID: &'static str = "ADMINAUTH_CLIENT_ID";
    pub const AUDIENCE: &'static str = "ADMINAUTH_AUDIENCE";

    // Scopes
    pub const SCOPE: &'static str = "ADMINAUTH_SCOPE"; // e.g. "openid profile email read write"
    pub const API_SCOPE: &'static str = "ADMINAUTH_API_SCOPE"; // e.g. "read write"

    // Admission
    pub const ADMIN_ROLE: &'static str = "ADMINAUTH_ADMIN_ROLE";
    pub const ROLES_CLAIM: &'static str = "ADMINAUTH_ROLES_CLAIM";
    pub const ADMIN_CLAIM: &'static str = "ADMINAUTH_ADMIN_CLAIM"; // legacy alias of ROLES_CLAIM

    // Application
    pub const API_URL: &'static str = "ADMINAUTH_API_URL";
    pub const ORIGIN: &'static str = "ADMINAUTH_ORIGIN";
}

pub const DEFAULT_ADMIN_ROLE: &str = "admin";
pub const DEFAULT_LOGIN_SCOPE: &str = "openid profile email read write";
pub const DEFAULT_API_SCOPE: &str = "read write";
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";

/// Scopes that only make sense for the login request, never for API tokens
pub const OIDC_SCOPES: [&str; 3] = ["openid", "profile", "email"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    pub domain: String,
    pub client_id: String,
    pub audience: Option<String>,
    pub login_scope: Option<String>,
    pub api_scope: Option<String>,
    pub admin_role: String,
    pub roles_claim: Option<String>,
    pub api_url: String,
    pub origin: String,
}

/// Parameters for requesting an API access token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    pub scope: String,
}

impl AuthConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Values are trimmed and empty
    /// values count as absent.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let config = Self {
            domain: get(ConfigKeys::DOMAIN).unwrap_or_default(),
            client_id: get(ConfigKeys::CLIENT_ID).unwrap_or_default(),
            audience: get(ConfigKeys::AUDIENCE),
            login_scope: get(ConfigKeys::SCOPE),
            api_scope: get(ConfigKeys::API_SCOPE),
            admin_role: get(ConfigKeys::ADMIN_ROLE)
                .unwrap_or_else(|| DEFAULT_ADMIN_ROLE.to_string()),
            roles_claim: get(ConfigKeys::ROLES_CLAIM).or_else(|| get(ConfigKeys::ADMIN_CLAIM)),
            api_url: get(ConfigKeys::API_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            origin: get(ConfigKeys::ORIGIN).unwrap_or_else(|| DEFAULT_ORIGIN.to_string()),
        };

        for key in config.missing_required() {
            warn!(key = %key, "Identity provider setting is not configured");
        }

        config
    }

    /// Required settings that are empty
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.domain.is_empty() {
            missing.push(ConfigKeys::DOMAIN);
        }
        if self.client_id.is_empty() {
            missing.push(ConfigKeys::CLIENT_ID);
        }
        missing
    }

    /// Custom claim namespace, `https://<domain>/`
    pub fn namespace(&self) -> Option<String> {
        (!self.domain.is_empty()).then(|| format!("https://{}/", self.domain))
    }

    pub fn login_scope(&self) -> String {
        self.login_scope
            .clone()
            .unwrap_or_else(|| DEFAULT_LOGIN_SCOPE.to_string())
    }

    /// Access-token request parameters for the API.
    ///
    /// Uses the API scope when set, otherwise the non-OIDC part of the login
    /// scope, otherwise `read write`.
    pub fn resource_params(&self) -> TokenRequest {
        let scope = self
            .api_scope
            .clone()
            .or_else(|| {
                self.login_scope.as_deref().map(|scope| {
                    scope
                        .split_whitespace()
                        .filter(|s| !OIDC_SCOPES.contains(s))
                        .collect::<Vec<_>>()
                        .join(" ")
                })
            })
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_API_SCOPE.to_string());

        TokenRequest {
            audience: self.audience.clone(),
            scope,
        }
    }

    /// Claim names probed for roles, highest priority first, without
    /// duplicates.
    pub fn role_claim_candidates(&self) -> Vec<String> {
        let default_claim = match self.namespace() {
            Some(ns) => format!("{}roles", ns),
            None => "roles".to_string(),
        };

        let mut candidates: Vec<String> = Vec::new();
        for name in [self.roles_claim.clone(), Some(default_claim), Some("roles".to_string())]
            .into_iter()
            .flatten()
        {
            if !candidates.contains(&name) {
                candidates.push(name);
            }
        }
        candidates
    }
}
