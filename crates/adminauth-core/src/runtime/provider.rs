use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::auth::ClaimSet;
use crate::config::TokenRequest;
use crate::error::SessionError;

/// Identity token claims as handed out by the provider SDK
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IdTokenClaims {
    /// Claims the SDK already decoded
    pub claims: ClaimSet,
    /// The raw compact token, when the SDK exposes it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

/// Parameters of a redirect-based authorization request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub redirect_uri: String,
    pub scope: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_hint: Option<String>,
}

/// Identity provider SDK boundary (Auth0, Okta...).
///
/// The provider owns the OAuth protocol; this crate only consumes its
/// results. Implementations must be Send + Sync for use across async
/// boundaries.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Claims of the current identity token, `None` when there is none
    async fn id_token_claims(&self) -> Result<Option<IdTokenClaims>, SessionError>;

    /// Silently obtain an access token for the API
    async fn access_token(&self, request: &TokenRequest) -> Result<String, SessionError>;

    /// Start a redirect login. Returns once the redirect has been issued.
    async fn login_with_redirect(&self, request: AuthorizationRequest) -> Result<(), SessionError>;

    /// End the provider session and return the browser to `return_to`
    async fn logout(&self, return_to: &str) -> Result<(), SessionError>;
}

#[async_trait]
impl<T: IdentityProvider + ?Sized> IdentityProvider for std::sync::Arc<T> {
    async fn id_token_claims(&self) -> Result<Option<IdTokenClaims>, SessionError> {
        (**self).id_token_claims().await
    }

    async fn access_token(&self, request: &TokenRequest) -> Result<String, SessionError> {
        (**self).access_token(request).await
    }

    async fn login_with_redirect(&self, request: AuthorizationRequest) -> Result<(), SessionError> {
        (**self).login_with_redirect(request).await
    }

    async fn logout(&self, return_to: &str) -> Result<(), SessionError> {
        (**self).logout(return_to).await
    }
}
