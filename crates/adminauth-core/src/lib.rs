pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod login;
pub mod runtime;
pub mod session;

pub use config::AuthConfig;
pub use error::{AuthError, SessionError};
pub use guard::{GuardDecision, GuardInput, GuardedView, RouteGuard};
pub use session::{AuthSignal, Session, SessionSynchronizer, SyncState, UserProfile};

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";
/// Path of the landing view that immediately forwards to login.
pub const ROOT_PATH: &str = "/";
/// Path of the default protected view.
pub const DASHBOARD_PATH: &str = "/dashboard";
