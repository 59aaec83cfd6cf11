//! Route guarding for protected views

use serde::{Deserialize, Serialize};

use crate::session::Session;
use crate::LOGIN_PATH;

/// What the guard needs to know about the current navigation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GuardInput {
    /// Provider is still determining authentication status
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub session: Option<Session>,
    /// Location the caller asked for
    pub requested_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardDecision {
    Loading,
    Redirect { to: String, from: Option<String> },
    Render,
}

/// Result of guarding a view: the view itself is only built on admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardedView<T> {
    Loading,
    Redirect { to: String, from: Option<String> },
    View(T),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard {
    login_path: String,
    preserve_location: bool,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self {
            login_path: LOGIN_PATH.to_string(),
            preserve_location: false,
        }
    }

    pub fn with_login_path(mut self, path: impl Into<String>) -> Self {
        self.login_path = path.into();
        self
    }

    /// Carry the requested location along with redirects so login can
    /// return there
    pub fn preserve_location(mut self, enabled: bool) -> Self {
        self.preserve_location = enabled;
        self
    }

    pub fn check(&self, input: &GuardInput) -> GuardDecision {
        if input.is_loading {
            return GuardDecision::Loading;
        }

        let admitted = input.is_authenticated
            && input.session.as_ref().map(|s| s.is_admin).unwrap_or(false);
        if admitted {
            return GuardDecision::Render;
        }

        GuardDecision::Redirect {
            to: self.login_path.clone(),
            from: if self.preserve_location {
                input.requested_path.clone()
            } else {
                None
            },
        }
    }

    /// Guard a view; `render` runs only when the caller is admitted
    pub fn protect<T, F>(&self, input: &GuardInput, render: F) -> GuardedView<T>
    where
        F: FnOnce() -> T,
    {
        match self.check(input) {
            GuardDecision::Loading => GuardedView::Loading,
            GuardDecision::Redirect { to, from } => GuardedView::Redirect { to, from },
            GuardDecision::Render => GuardedView::View(render()),
        }
    }
}
