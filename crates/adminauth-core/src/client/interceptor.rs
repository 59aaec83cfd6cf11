//! Outbound bearer-token resolution

use async_trait::async_trait;
use tracing::warn;

use crate::config::TokenRequest;
use crate::error::SessionError;
use crate::runtime::IdentityProvider;

/// Resolves the access token attached to outgoing API requests
#[async_trait]
pub trait TokenResolver: Send + Sync {
    async fn resolve(&self) -> Result<Option<String>, SessionError>;
}

/// Resolves API tokens silently through the identity provider
pub struct ProviderTokenResolver<P: IdentityProvider> {
    provider: P,
    request: TokenRequest,
}

impl<P: IdentityProvider> ProviderTokenResolver<P> {
    pub fn new(provider: P, request: TokenRequest) -> Self {
        Self { provider, request }
    }
}

#[async_trait]
impl<P: IdentityProvider> TokenResolver for ProviderTokenResolver<P> {
    async fn resolve(&self) -> Result<Option<String>, SessionError> {
        let token = self.provider.access_token(&self.request).await?;
        Ok(Some(token).filter(|t| !t.is_empty()))
    }
}

/// Token to attach, if any. A failing resolver never blocks the request;
/// the header is simply omitted.
pub async fn resolve_bearer(resolver: Option<&dyn TokenResolver>) -> Option<String> {
    let resolver = resolver?;
    match resolver.resolve().await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Could not obtain an access token for the request");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(Result<Option<String>, String>);

    #[async_trait]
    impl TokenResolver for Fixed {
        async fn resolve(&self) -> Result<Option<String>, SessionError> {
            self.0.clone().map_err(SessionError::Provider)
        }
    }

    #[tokio::test]
    async fn test_resolve_bearer() {
        assert_eq!(resolve_bearer(None).await, None);

        let ok = Fixed(Ok(Some("abc".to_string())));
        assert_eq!(resolve_bearer(Some(&ok)).await, Some("abc".to_string()));

        let empty = Fixed(Ok(None));
        assert_eq!(resolve_bearer(Some(&empty)).await, None);

        let failing = Fixed(Err("login_required".to_string()));
        assert_eq!(resolve_bearer(Some(&failing)).await, None);
    }
}
