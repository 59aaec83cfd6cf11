use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::SessionError;

/// Status and body of a completed HTTP exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// HTTP client abstraction for talking to the backend.
/// Transport failures are errors; non-2xx statuses are returned as responses.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Perform a GET request, optionally with a bearer token
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, SessionError>;

    /// Perform a POST request with a JSON body, optionally with a bearer token
    async fn post(
        &self,
        url: &str,
        body: &str,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, SessionError>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for std::sync::Arc<T> {
    async fn get(&self, url: &str, bearer: Option<&str>) -> Result<HttpResponse, SessionError> {
        (**self).get(url, bearer).await
    }

    async fn post(
        &self,
        url: &str,
        body: &str,
        bearer: Option<&str>,
    ) -> Result<HttpResponse, SessionError> {
        (**self).post(url, body, bearer).await
    }
}
