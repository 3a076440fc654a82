//! Authentication session
//!
//! The [`SessionStore`] owns the single [`Session`] of the dashboard and
//! publishes it on a watch channel. Views consult a [`RouteGuard`] before
//! rendering protected screens, and follow the [`NavigationIntent`]s the store
//! publishes after login and logout.

mod guard;
mod store;

pub use guard::{GuardDecision, RouteGuard};
pub use store::SessionStore;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AuthStatus {
    Unauthenticated,
    /// Startup probe in flight
    Authenticating,
    Authenticated,
    /// Reserved; the store never enters it and guards treat it as signed out
    AuthError,
}

impl AuthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
            Self::AuthError => "auth_error",
        }
    }

    pub fn is_settled(&self) -> bool {
        *self != Self::Authenticating
    }
}

impl std::fmt::Display for AuthStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub status: AuthStatus,
    pub identity: Option<String>,
    pub last_error: Option<String>,
}

impl Session {
    /// State at startup, before the probe resolves
    pub fn starting() -> Self {
        Self {
            status: AuthStatus::Authenticating,
            identity: None,
            last_error: None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == AuthStatus::Authenticated
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::starting()
    }
}

/// Where the view layer should go next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NavigationIntent {
    /// `/dashboard`, after a successful login
    Dashboard,
    /// `/login`, after logout or an expired session
    Login,
}

impl NavigationIntent {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Dashboard => "/dashboard",
            Self::Login => "/login",
        }
    }
}
