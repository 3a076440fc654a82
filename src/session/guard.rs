//! Route protection

use super::{AuthStatus, Session};
use tokio::sync::watch;

/// What a protected view should do for the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GuardDecision {
    /// Session not settled yet; show a loading indicator
    Pending,
    Render,
    RedirectToLogin,
}

/// Gate for protected views, fed by the session watch channel.
///
/// # Example
///
/// ```rust,ignore
/// let mut guard = RouteGuard::new(context.session().subscribe());
/// match guard.settled().await {
///     GuardDecision::Render => render_dashboard(),
///     _ => navigate("/login"),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RouteGuard {
    session: watch::Receiver<Session>,
}

impl RouteGuard {
    pub fn new(session: watch::Receiver<Session>) -> Self {
        Self { session }
    }

    pub fn decide(session: &Session) -> GuardDecision {
        match session.status {
            AuthStatus::Authenticating => GuardDecision::Pending,
            AuthStatus::Authenticated => GuardDecision::Render,
            AuthStatus::Unauthenticated | AuthStatus::AuthError => GuardDecision::RedirectToLogin,
        }
    }

    /// Decision for the session as it is now
    pub fn current(&self) -> GuardDecision {
        Self::decide(&self.session.borrow())
    }

    /// Wait until the session leaves `Authenticating`, then decide
    pub async fn settled(&mut self) -> GuardDecision {
        let settled = self
            .session
            .wait_for(|session| session.status.is_settled())
            .await
            .map(|session| Self::decide(&session));
        settled.unwrap_or_else(|_| self.current())
    }

    /// Wait for the next session change and decide again.
    ///
    /// Returns `None` once the store is gone.
    pub async fn changed(&mut self) -> Option<GuardDecision> {
        self.session.changed().await.ok()?;
        Some(self.current())
    }
}
