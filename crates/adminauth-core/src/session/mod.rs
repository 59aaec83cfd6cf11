//! Local session state and the synchronizer that owns it

pub mod synchronizer;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::auth::ClaimSet;

pub use synchronizer::SessionSynchronizer;

/// Authentication status reported by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthSignal {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user: Option<UserProfile>,
}

impl AuthSignal {
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::default()
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn signed_in(user: UserProfile) -> Self {
        Self {
            is_loading: false,
            is_authenticated: true,
            user: Some(user),
        }
    }
}

/// User profile exposed by the identity provider
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub sub: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// The authenticated and admitted user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub subject_id: String,
    pub display_name: String,
    pub email: String,
    pub role: String,
    pub roles: Vec<String>,
    /// Connection the subject signed in with, e.g. `google-oauth2`
    pub provider: String,
    pub is_admin: bool,
}

impl Session {
    /// Only called after admission succeeded, so `is_admin` always holds.
    pub(crate) fn admitted(profile: &UserProfile, roles: Vec<String>, admin_role: &str) -> Self {
        let provider = profile
            .sub
            .split('|')
            .next()
            .filter(|c| !c.is_empty())
            .unwrap_or("auth0")
            .to_string();

        Self {
            subject_id: profile.sub.clone(),
            display_name: [&profile.name, &profile.nickname]
                .into_iter()
                .flatten()
                .find(|n| !n.is_empty())
                .cloned()
                .unwrap_or_else(|| "User".to_string()),
            email: profile.email.clone().unwrap_or_default(),
            role: admin_role.to_string(),
            roles,
            provider,
            is_admin: true,
        }
    }
}

/// Why an authenticated identity was not admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// No configured role claim carried any value
    MissingRoleClaim,
    /// Roles were present but not the admin role
    InsufficientRole,
}

impl DenialReason {
    pub fn from_roles(roles: &[String]) -> Self {
        if roles.is_empty() {
            DenialReason::MissingRoleClaim
        } else {
            DenialReason::InsufficientRole
        }
    }

    /// User-facing explanation
    pub fn message(&self) -> &'static str {
        match self {
            DenialReason::MissingRoleClaim => {
                "Access denied: the token does not contain the configured roles claim."
            }
            DenialReason::InsufficientRole => {
                "Access denied: your account does not have the role required to use the panel."
            }
        }
    }
}

/// Session synchronizer state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    Unauthenticated,
    /// A cycle is in flight; `prior` is restored if it fails
    Synchronizing { prior: Box<SyncState> },
    Authorized(Session),
    /// `warned` is set once the denial warning has been shown since sign-in
    Denied { reason: DenialReason, warned: bool },
}

impl SyncState {
    /// Session of the most recent completed cycle
    pub fn session(&self) -> Option<&Session> {
        match self {
            SyncState::Authorized(session) => Some(session),
            SyncState::Synchronizing { prior } => prior.session(),
            _ => None,
        }
    }

    pub fn warned(&self) -> bool {
        match self {
            SyncState::Denied { warned, .. } => *warned,
            SyncState::Synchronizing { prior } => prior.warned(),
            _ => false,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SyncState::Unauthenticated => "unauthenticated",
            SyncState::Synchronizing { .. } => "synchronizing",
            SyncState::Authorized(_) => "authorized",
            SyncState::Denied { .. } => "denied",
        }
    }
}

/// Claims seen by the last synchronization cycle. Raw tokens are never kept.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticsSnapshot {
    pub captured_at: DateTime<Utc>,
    pub id_token_claims: Option<ClaimSet>,
    pub decoded_id_token: Option<ClaimSet>,
    pub access_token_claims: Option<ClaimSet>,
    pub roles: Vec<String>,
}
