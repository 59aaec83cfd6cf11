pub mod http;
pub mod navigator;
pub mod notifier;
pub mod provider;
pub mod storage;

pub use http::{HttpClient, HttpResponse};
pub use navigator::Navigator;
pub use notifier::Notifier;
pub use provider::{AuthorizationRequest, IdTokenClaims, IdentityProvider};
pub use storage::{KeyValueStore, MemoryStore};
