//! Session store

use super::{AuthStatus, NavigationIntent, Session};
use crate::error::{ApiError, Result};
use crate::traits::{AuthApi, AuthFailureListener};
use crate::types::{Credentials, MessageResponse, PLACEHOLDER_IDENTITY};
use std::sync::Arc;
use tokio::sync::{broadcast, watch, OnceCell};
use tracing::{info, warn};

const INTENT_CAPACITY: usize = 16;

/// State shared with the resource client through [`AuthFailureListener`].
///
/// Holds no reference to the client, so registering it as the client's
/// listener creates no cycle.
struct SessionState {
    session: watch::Sender<Session>,
    intents: broadcast::Sender<NavigationIntent>,
}

impl SessionState {
    fn navigate(&self, intent: NavigationIntent) {
        // No subscribers is fine; the view layer may not be listening yet.
        let _ = self.intents.send(intent);
    }

    fn sign_out(&self, last_error: Option<String>) {
        self.session.send_modify(|session| {
            session.status = AuthStatus::Unauthenticated;
            session.identity = None;
            session.last_error = last_error;
        });
        self.navigate(NavigationIntent::Login);
    }
}

impl AuthFailureListener for SessionState {
    fn on_unauthorized(&self, error: &ApiError) {
        let expired = self.session.send_if_modified(|session| {
            if session.status != AuthStatus::Authenticated {
                return false;
            }
            session.status = AuthStatus::Unauthenticated;
            session.identity = None;
            session.last_error = Some("Session expired".to_string());
            true
        });
        if expired {
            info!(status = ?error.status, "Session expired; signing out");
            self.navigate(NavigationIntent::Login);
        }
    }
}

/// Owner of the dashboard session.
///
/// Status starts as `Authenticating` and settles after [`initialize`]. Only
/// these transitions happen: `Authenticating` to either settled state,
/// `Authenticated` to `Unauthenticated` (logout or an authorization failure
/// on any resource call) and `Unauthenticated` to `Authenticated` (login).
///
/// [`initialize`]: SessionStore::initialize
#[derive(Clone)]
pub struct SessionStore {
    api: Arc<dyn AuthApi>,
    state: Arc<SessionState>,
    probe: Arc<OnceCell<()>>,
}

impl SessionStore {
    pub fn new(api: Arc<dyn AuthApi>) -> Self {
        let (session, _) = watch::channel(Session::starting());
        let (intents, _) = broadcast::channel(INTENT_CAPACITY);
        Self {
            api,
            state: Arc::new(SessionState { session, intents }),
            probe: Arc::new(OnceCell::new()),
        }
    }

    /// Listener to register with the resource client
    pub fn auth_listener(&self) -> Arc<dyn AuthFailureListener> {
        self.state.clone()
    }

    /// Current session snapshot
    pub fn session(&self) -> Session {
        self.state.session.borrow().clone()
    }

    pub fn status(&self) -> AuthStatus {
        self.state.session.borrow().status
    }

    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.session.subscribe()
    }

    pub fn navigation(&self) -> broadcast::Receiver<NavigationIntent> {
        self.state.intents.subscribe()
    }

    /// Run the startup probe.
    ///
    /// The probe runs once per store; concurrent and later calls wait for it
    /// and return the current session.
    pub async fn initialize(&self) -> Session {
        self.probe.get_or_init(|| self.run_probe()).await;
        self.session()
    }

    async fn run_probe(&self) {
        let result = self.api.probe().await;

        // A login that completed while the probe was in flight wins.
        let settled = self.state.session.send_if_modified(|session| {
            if session.status != AuthStatus::Authenticating {
                return false;
            }
            match &result {
                Ok(identity) => {
                    session.status = AuthStatus::Authenticated;
                    session.identity = Some(
                        identity
                            .clone()
                            .unwrap_or_else(|| PLACEHOLDER_IDENTITY.to_string()),
                    );
                }
                Err(_) => {
                    session.status = AuthStatus::Unauthenticated;
                    session.identity = None;
                }
            }
            true
        });

        match (&result, settled) {
            (_, false) => info!("Session probe resolved after login; ignoring"),
            (Ok(_), true) => info!("Existing session accepted"),
            (Err(err), true) => info!(kind = %err.kind, "No active session"),
        }
    }

    /// Wait until the startup probe has settled the session
    pub async fn wait_settled(&self) -> Session {
        let mut rx = self.subscribe();
        let settled = rx
            .wait_for(|session| session.status.is_settled())
            .await
            .map(|session| session.clone());
        settled.unwrap_or_else(|_| self.session())
    }

    /// Sign in. A no-op returning the current session when already signed in.
    ///
    /// On success publishes [`NavigationIntent::Dashboard`].
    pub async fn login(&self, credentials: &Credentials) -> Result<Session> {
        if self.status() == AuthStatus::Authenticated {
            return Ok(self.session());
        }

        match self.api.login(credentials).await {
            Ok(response) => {
                let identity = response
                    .username
                    .filter(|name| !name.is_empty())
                    .unwrap_or_else(|| PLACEHOLDER_IDENTITY.to_string());
                self.state.session.send_modify(|session| {
                    session.status = AuthStatus::Authenticated;
                    session.identity = Some(identity);
                    session.last_error = None;
                });
                info!(username = %credentials.username, "Logged in");
                self.state.navigate(NavigationIntent::Dashboard);
                Ok(self.session())
            }
            Err(err) => {
                warn!(kind = %err.kind, "Login failed");
                self.state.session.send_modify(|session| {
                    session.status = AuthStatus::Unauthenticated;
                    session.identity = None;
                    session.last_error = Some(err.message.clone());
                });
                Err(err)
            }
        }
    }

    /// Sign out.
    ///
    /// The local session is cleared and [`NavigationIntent::Login`] published
    /// even when the request fails; the failure is still returned.
    pub async fn logout(&self) -> Result<()> {
        let result = self.api.logout().await;
        match &result {
            Ok(()) => {
                info!("Logged out");
                self.state.sign_out(None);
            }
            Err(err) => {
                warn!(error = %err, "Logout request failed; clearing local session");
                self.state.sign_out(Some(err.message.clone()));
            }
        }
        result
    }

    /// Create an admin account. The session is unchanged.
    pub async fn register(&self, credentials: &Credentials) -> Result<MessageResponse> {
        let response = self.api.register(credentials).await?;
        info!(username = %credentials.username, "Registered account");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::LoginResponse;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeAuth {
        probe_ok: bool,
        login_ok: bool,
        logout_ok: bool,
        probe_calls: AtomicUsize,
        /// When set, the probe waits for a notification before resolving
        hold_probe: Option<Arc<Notify>>,
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn probe(&self) -> Result<Option<String>> {
            self.probe_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.hold_probe {
                gate.notified().await;
            }
            if self.probe_ok {
                Ok(None)
            } else {
                Err(ApiError::from_status(401, "Unauthorized"))
            }
        }

        async fn login(&self, credentials: &Credentials) -> Result<LoginResponse> {
            if self.login_ok {
                Ok(LoginResponse {
                    username: Some(credentials.username.clone()),
                    message: None,
                })
            } else {
                Err(ApiError::from_status(401, "Invalid credentials"))
            }
        }

        async fn logout(&self) -> Result<()> {
            if self.logout_ok {
                Ok(())
            } else {
                Err(ApiError::network("connection reset"))
            }
        }

        async fn register(&self, _credentials: &Credentials) -> Result<MessageResponse> {
            Ok(MessageResponse {
                message: Some("created".into()),
            })
        }
    }

    fn new_store(fake: FakeAuth) -> (SessionStore, Arc<FakeAuth>) {
        let fake = Arc::new(fake);
        (SessionStore::new(fake.clone()), fake)
    }

    #[tokio::test]
    async fn test_probe_failure_settles_unauthenticated() {
        let (store, _) = new_store(FakeAuth::default());
        assert_eq!(store.status(), AuthStatus::Authenticating);

        let session = store.initialize().await;
        assert_eq!(session.status, AuthStatus::Unauthenticated);
        assert_eq!(session.identity, None);
    }

    #[tokio::test]
    async fn test_probe_success_uses_placeholder_identity() {
        let (store, _) = new_store(FakeAuth {
            probe_ok: true,
            ..Default::default()
        });
        let session = store.initialize().await;
        assert_eq!(session.status, AuthStatus::Authenticated);
        assert_eq!(session.identity.as_deref(), Some(PLACEHOLDER_IDENTITY));
    }

    #[tokio::test]
    async fn test_probe_runs_once() {
        let (store, fake) = new_store(FakeAuth::default());
        let (a, b) = tokio::join!(store.initialize(), store.initialize());
        store.initialize().await;

        assert_eq!(a, b);
        assert_eq!(fake.probe_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_login_publishes_dashboard_intent() {
        let (store, _) = new_store(FakeAuth {
            login_ok: true,
            ..Default::default()
        });
        store.initialize().await;
        let mut intents = store.navigation();

        let session = store
            .login(&Credentials::new("admin", "secret"))
            .await
            .unwrap();

        assert_eq!(session.status, AuthStatus::Authenticated);
        assert_eq!(session.identity.as_deref(), Some("admin"));
        assert_eq!(intents.try_recv().unwrap(), NavigationIntent::Dashboard);
    }

    #[tokio::test]
    async fn test_login_failure_records_error() {
        let (store, _) = new_store(FakeAuth::default());
        store.initialize().await;

        let err = store
            .login(&Credentials::new("admin", "wrong"))
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Unauthorized);
        let session = store.session();
        assert_eq!(session.status, AuthStatus::Unauthenticated);
        assert_eq!(session.last_error.as_deref(), Some("Invalid credentials"));
    }

    #[tokio::test]
    async fn test_login_when_authenticated_is_noop() {
        let (store, _) = new_store(FakeAuth {
            probe_ok: true,
            login_ok: false,
            ..Default::default()
        });
        store.initialize().await;

        let session = store
            .login(&Credentials::new("someone", "else"))
            .await
            .unwrap();
        assert_eq!(session.identity.as_deref(), Some(PLACEHOLDER_IDENTITY));
    }

    #[tokio::test]
    async fn test_logout_failure_still_signs_out() {
        let (store, _) = new_store(FakeAuth {
            probe_ok: true,
            ..Default::default()
        });
        store.initialize().await;
        let mut intents = store.navigation();

        let err = store.logout().await.unwrap_err();

        assert_eq!(err.kind, ErrorKind::Network);
        let session = store.session();
        assert_eq!(session.status, AuthStatus::Unauthenticated);
        assert_eq!(session.identity, None);
        assert!(session.last_error.is_some());
        assert_eq!(intents.try_recv().unwrap(), NavigationIntent::Login);
    }

    #[tokio::test]
    async fn test_late_probe_does_not_override_login() {
        let gate = Arc::new(Notify::new());
        let (store, _) = new_store(FakeAuth {
            probe_ok: false,
            login_ok: true,
            hold_probe: Some(gate.clone()),
            ..Default::default()
        });

        let probing = {
            let store = store.clone();
            tokio::spawn(async move { store.initialize().await })
        };
        tokio::task::yield_now().await;

        store
            .login(&Credentials::new("admin", "secret"))
            .await
            .unwrap();
        gate.notify_one();

        let session = probing.await.unwrap();
        assert_eq!(session.status, AuthStatus::Authenticated);
        assert_eq!(session.identity.as_deref(), Some("admin"));
    }

    #[tokio::test]
    async fn test_unauthorized_signs_out_only_when_authenticated() {
        let (store, _) = new_store(FakeAuth::default());
        let listener = store.auth_listener();
        let mut intents = store.navigation();

        listener.on_unauthorized(&ApiError::from_status(401, "expired"));
        assert_eq!(store.status(), AuthStatus::Authenticating);
        assert!(intents.try_recv().is_err());

        let (store, _) = new_store(FakeAuth {
            probe_ok: true,
            ..Default::default()
        });
        store.initialize().await;
        let mut intents = store.navigation();

        store
            .auth_listener()
            .on_unauthorized(&ApiError::from_status(403, "forbidden"));

        let session = store.session();
        assert_eq!(session.status, AuthStatus::Unauthenticated);
        assert_eq!(session.last_error.as_deref(), Some("Session expired"));
        assert_eq!(intents.try_recv().unwrap(), NavigationIntent::Login);
    }

    #[tokio::test]
    async fn test_register_leaves_session_alone() {
        let (store, _) = new_store(FakeAuth::default());
        store.initialize().await;

        let response = store
            .register(&Credentials::new("new", "admin"))
            .await
            .unwrap();
        assert_eq!(response.message.as_deref(), Some("created"));
        assert_eq!(store.status(), AuthStatus::Unauthenticated);
    }
}
