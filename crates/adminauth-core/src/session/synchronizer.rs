//! Session synchronization over identity-provider signals
//!
//! Every authentication-state change runs a cycle: fetch the identity and
//! access tokens, decode them, collect roles, and either admit the user or
//! deny them. The synchronizer is the only writer of the session.
//!
//! Overlapping cycles are resolved last-write-wins: each signal bumps a
//! generation counter and a cycle only commits if its generation is still
//! the current one.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{AuthSignal, DenialReason, DiagnosticsSnapshot, Session, SyncState, UserProfile};
use crate::auth::{collect_roles, decode_payload, has_role};
use crate::client::BackendUser;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::runtime::{IdTokenClaims, IdentityProvider, Navigator, Notifier};
use crate::{DASHBOARD_PATH, LOGIN_PATH, ROOT_PATH};

struct Inner {
    state: SyncState,
    generation: u64,
    /// One-time denial warning already shown; cleared only when signed out
    warned: bool,
    diagnostics: Option<DiagnosticsSnapshot>,
}

/// Outcome of an admission decision, applied after the lock is released
enum Commit {
    Stale,
    Authorized,
    Denied { alert: Option<DenialReason> },
}

pub struct SessionSynchronizer<P: IdentityProvider, N: Navigator, A: Notifier> {
    provider: P,
    navigator: N,
    notifier: A,
    config: AuthConfig,
    role_claims: Vec<String>,
    capture_diagnostics: bool,
    inner: Mutex<Inner>,
}

impl<P: IdentityProvider, N: Navigator, A: Notifier> SessionSynchronizer<P, N, A> {
    pub fn new(provider: P, navigator: N, notifier: A, config: AuthConfig) -> Self {
        let role_claims = config.role_claim_candidates();
        Self {
            provider,
            navigator,
            notifier,
            config,
            role_claims,
            capture_diagnostics: false,
            inner: Mutex::new(Inner {
                state: SyncState::Unauthenticated,
                generation: 0,
                warned: false,
                diagnostics: None,
            }),
        }
    }

    /// Keep the decoded claims of the last cycle for [`Self::diagnostics`]
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.capture_diagnostics = enabled;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn navigator(&self) -> &N {
        &self.navigator
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn state(&self) -> SyncState {
        self.lock().state.clone()
    }

    /// Snapshot of the current session, if the user is admitted
    pub fn session(&self) -> Option<Session> {
        self.lock().state.session().cloned()
    }

    pub fn is_admin(&self) -> bool {
        self.lock()
            .state
            .session()
            .map(|s| s.is_admin)
            .unwrap_or(false)
    }

    pub fn diagnostics(&self) -> Option<DiagnosticsSnapshot> {
        self.lock().diagnostics.clone()
    }

    /// React to an identity-provider state change
    pub async fn on_auth_change(&self, signal: AuthSignal) {
        if signal.is_loading {
            return;
        }

        match (signal.is_authenticated, signal.user) {
            (true, Some(user)) => self.synchronize(user).await,
            _ => self.reset(),
        }
    }

    /// Explicit user logout
    pub async fn logout(&self) {
        if let Err(e) = self.provider.logout(&self.config.origin).await {
            error!(error = %e, "Identity provider logout failed");
        }
        {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = SyncState::Unauthenticated;
            inner.warned = false;
            inner.diagnostics = None;
        }
        self.navigator.navigate(LOGIN_PATH, true);
    }

    /// Admit a user returned by the backend (credential login or OAuth
    /// callback) using the same rule as provider-driven cycles.
    pub fn admit_backend_user(&self, user: &BackendUser) -> Result<Session, AuthError> {
        let mut roles = user.roles.clone();
        if let Some(role) = user.role.as_ref().filter(|r| !r.is_empty()) {
            if !roles.contains(role) {
                roles.push(role.clone());
            }
        }

        let profile = UserProfile {
            sub: user.id.clone(),
            name: user.name.clone(),
            nickname: None,
            email: user.email.clone(),
        };

        let generation = {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.generation
        };

        match self.commit(generation, &profile, roles, None) {
            Commit::Authorized => self
                .session()
                .ok_or_else(|| AuthError::AccessDenied("session superseded".to_string())),
            Commit::Denied { alert } => {
                let reason = self.apply_denial_alert(alert);
                Err(AuthError::AccessDenied(reason.message().to_string()))
            }
            Commit::Stale => Err(AuthError::AccessDenied("session superseded".to_string())),
        }
    }

    async fn synchronize(&self, user: UserProfile) {
        let generation = self.begin_cycle();
        let request = self.config.resource_params();

        let (id_token, access_token) = futures_util::join!(
            self.provider.id_token_claims(),
            self.provider.access_token(&request)
        );

        let (id_token, access_token) = match (id_token, access_token) {
            (Ok(id_token), Ok(access_token)) => (id_token, access_token),
            (Err(e), _) | (_, Err(e)) => {
                error!(error = %e, "Could not synchronize the identity provider session");
                self.abort_cycle(generation);
                return;
            }
        };

        let (roles, snapshot) = self.extract_roles(id_token.as_ref(), &access_token);

        match self.commit(generation, &user, roles.clone(), snapshot) {
            Commit::Stale => {
                debug!(generation = generation, "Discarding superseded synchronization cycle");
            }
            Commit::Authorized => {
                debug!(?roles, "Identity provider session synchronized");
                let path = self.navigator.current_path();
                if path == LOGIN_PATH || path == ROOT_PATH {
                    self.navigator.navigate(DASHBOARD_PATH, true);
                }
            }
            Commit::Denied { alert } => {
                self.apply_denial_alert(alert);
                if let Err(e) = self.provider.logout(&self.config.origin).await {
                    error!(error = %e, "Identity provider logout failed");
                }
                if !self.is_current(generation) {
                    debug!(generation = generation, "Denied cycle superseded during logout");
                    return;
                }
                if self.navigator.current_path() != LOGIN_PATH {
                    self.navigator.navigate(LOGIN_PATH, true);
                }
            }
        }
    }

    fn extract_roles(
        &self,
        id_token: Option<&IdTokenClaims>,
        access_token: &str,
    ) -> (Vec<String>, Option<DiagnosticsSnapshot>) {
        let id_claims = id_token.map(|t| &t.claims);
        let decoded_id = id_token.and_then(|t| decode_payload(t.raw.as_deref()));
        let decoded_access = decode_payload(Some(access_token));

        let roles = collect_roles(
            &[id_claims, decoded_id.as_ref(), decoded_access.as_ref()],
            &self.role_claims,
        );

        let snapshot = self.capture_diagnostics.then(|| DiagnosticsSnapshot {
            captured_at: Utc::now(),
            id_token_claims: id_claims.cloned(),
            decoded_id_token: decoded_id,
            access_token_claims: decoded_access,
            roles: roles.clone(),
        });

        (roles, snapshot)
    }

    fn is_current(&self, generation: u64) -> bool {
        self.lock().generation == generation
    }

    fn begin_cycle(&self) -> u64 {
        let mut inner = self.lock();
        inner.generation += 1;

        // Overlapping cycles share the state of the last completed one
        if !matches!(inner.state, SyncState::Synchronizing { .. }) {
            let prior = std::mem::replace(&mut inner.state, SyncState::Unauthenticated);
            inner.state = SyncState::Synchronizing {
                prior: Box::new(prior),
            };
        }
        inner.generation
    }

    fn abort_cycle(&self, generation: u64) {
        let mut inner = self.lock();
        if inner.generation != generation {
            return;
        }
        let restored = match &inner.state {
            SyncState::Synchronizing { prior } => Some((**prior).clone()),
            _ => None,
        };
        if let Some(prior) = restored {
            inner.state = prior;
        }
    }

    /// Decide admission and write the resulting state, if still current
    fn commit(
        &self,
        generation: u64,
        user: &UserProfile,
        roles: Vec<String>,
        snapshot: Option<DiagnosticsSnapshot>,
    ) -> Commit {
        let mut inner = self.lock();
        if inner.generation != generation {
            return Commit::Stale;
        }
        if snapshot.is_some() {
            inner.diagnostics = snapshot;
        }

        if has_role(&roles, &self.config.admin_role) {
            inner.state = SyncState::Authorized(Session::admitted(user, roles, &self.config.admin_role));
            return Commit::Authorized;
        }

        let reason = DenialReason::from_roles(&roles);
        let already_warned = inner.warned;
        inner.warned = true;
        inner.state = SyncState::Denied {
            reason,
            warned: true,
        };
        warn!(
            subject = %user.sub,
            ?roles,
            required = %self.config.admin_role,
            "Authenticated identity lacks the admin role"
        );

        Commit::Denied {
            alert: (!already_warned).then_some(reason),
        }
    }

    fn apply_denial_alert(&self, alert: Option<DenialReason>) -> DenialReason {
        match alert {
            Some(reason) => {
                info!(?reason, "Showing access denied warning");
                self.notifier.alert(reason.message());
                reason
            }
            None => match &self.lock().state {
                SyncState::Denied { reason, .. } => *reason,
                _ => DenialReason::InsufficientRole,
            },
        }
    }

    fn reset(&self) {
        {
            let mut inner = self.lock();
            inner.generation += 1;
            inner.state = SyncState::Unauthenticated;
            inner.warned = false;
            inner.diagnostics = None;
        }

        let path = self.navigator.current_path();
        if path != LOGIN_PATH && path != ROOT_PATH {
            self.navigator.navigate(LOGIN_PATH, true);
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // State is always written whole, so a poisoned lock still holds a
        // consistent value
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}
