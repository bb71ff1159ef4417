//! Session gate
//!
//! Owns the session state, the query layer and the navigator. The gate
//! registers itself with the client so a failed token refresh signs the
//! user out everywhere at once.

use crate::context::{SessionAction, SessionState, SessionStore};
use crate::error::{SessionError, SessionResult};
use crate::navigator::Navigator;
use crate::queries::{Queries, QueryCache};
use crate::routes::{LOGIN_ROUTE, home_for, redirect_for};
use medibook_core::types::{ApiResponse, User, UserProfileUpdate};
use medibook_core::{LoginForm, SignupForm};
use medibook_http::{ClientError, MedibookClient, SessionListener};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::watch;

/// Reacts to an irrecoverable refresh failure
struct ExpiryHandler {
    store: Arc<SessionStore>,
    cache: Arc<QueryCache>,
    navigator: Arc<dyn Navigator>,
}

impl SessionListener for ExpiryHandler {
    fn session_expired(&self) {
        warn!("Session expired, signing out");
        self.store.dispatch(SessionAction::Expired);
        self.cache.clear();
        self.navigator.navigate(LOGIN_ROUTE);
    }
}

pub struct SessionGate {
    queries: Queries,
    store: Arc<SessionStore>,
    navigator: Arc<dyn Navigator>,
}

impl SessionGate {
    pub fn new(client: MedibookClient, navigator: Arc<dyn Navigator>) -> Self {
        let queries = Queries::new(client);
        let store = Arc::new(SessionStore::new());

        queries
            .client()
            .set_session_listener(Arc::new(ExpiryHandler {
                store: Arc::clone(&store),
                cache: queries.shared_cache(),
                navigator: Arc::clone(&navigator),
            }));

        Self {
            queries,
            store,
            navigator,
        }
    }

    pub fn state(&self) -> SessionState {
        self.store.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.store.subscribe()
    }

    pub const fn client(&self) -> &MedibookClient {
        self.queries.client()
    }

    pub const fn queries(&self) -> &Queries {
        &self.queries
    }

    /// The signed-in user, or `NotAuthenticated`
    pub fn current_user(&self) -> SessionResult<User> {
        self.state()
            .user()
            .cloned()
            .ok_or(SessionError::NotAuthenticated)
    }

    /// Resolve the cold-start state from the stored token
    pub async fn bootstrap(&self) -> SessionState {
        if !self.client().tokens().has_session() {
            debug!("No stored token");
            self.store.dispatch(SessionAction::LoadFailed);
            return self.state();
        }

        let action = match self.queries.current_user().await {
            Ok(ApiResponse {
                data: Some(user), ..
            }) => {
                info!(role = %user.role, "Session restored");
                SessionAction::UserLoaded(user)
            }
            Ok(_) => {
                warn!("Current user response carried no data");
                SessionAction::LoadFailed
            }
            Err(err) => {
                info!(error = %err, "Could not restore session");
                SessionAction::LoadFailed
            }
        };
        self.store.dispatch(action);
        self.state()
    }

    /// Redirect away from `path` when the session may not be there
    pub fn enforce(&self, path: &str) -> Option<&'static str> {
        let target = redirect_for(&self.state(), path)?;
        debug!(from = path, to = target, "Redirecting");
        self.navigator.navigate(target);
        Some(target)
    }

    /// Validate, log in and go to the role's home
    pub async fn login(&self, form: LoginForm) -> SessionResult<User> {
        let response = self.queries.login(form).await?;
        let user = response.into_data().map_err(ClientError::from)?.user;

        self.store.dispatch(SessionAction::UserLoaded(user.clone()));
        self.navigator.navigate(home_for(user.role));
        Ok(user)
    }

    /// Register, then send the new account to the login page
    pub async fn signup(&self, form: SignupForm) -> SessionResult<ApiResponse<Value>> {
        let response = self.client().auth().signup_form(form).await?;
        self.navigator.navigate(LOGIN_ROUTE);
        Ok(response)
    }

    /// Sign out locally whatever the backend answers
    pub async fn logout(&self) -> SessionResult<()> {
        let result = self.queries.logout().await;
        let signed_out = self.state() == SessionState::Unauthenticated;
        self.store.dispatch(SessionAction::LoggedOut);
        // A failed refresh during the call has already navigated
        if !signed_out {
            self.navigator.navigate(LOGIN_ROUTE);
        }
        result.map(|_| ()).map_err(SessionError::from)
    }

    pub async fn update_profile(&self, update: &UserProfileUpdate) -> SessionResult<User> {
        let current = self.current_user()?;
        let user_id = current.user_id().ok_or(SessionError::NotAuthenticated)?;

        let user = self
            .queries
            .update_profile(user_id, update)
            .await?
            .into_data()
            .map_err(ClientError::from)?;
        self.store.dispatch(SessionAction::ProfileUpdated(user.clone()));
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigator::MockNavigator;
    use medibook_http::{ACCESS_TOKEN_KEY, MemoryStorage, REFRESH_TOKEN_KEY, TokenStorage};

    fn offline_client(with_tokens: bool) -> MedibookClient {
        let storage = Arc::new(MemoryStorage::new());
        if with_tokens {
            storage.set_item(ACCESS_TOKEN_KEY, "A1").unwrap();
            storage.set_item(REFRESH_TOKEN_KEY, "R1").unwrap();
        }
        // Nothing listens on the discard port.
        MedibookClient::builder()
            .base_url("http://127.0.0.1:9/api")
            .token_storage(storage)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_bootstrap_without_token_skips_lookup() {
        let mut navigator = MockNavigator::new();
        navigator.expect_navigate().never();
        let gate = SessionGate::new(offline_client(false), Arc::new(navigator));

        assert!(gate.state().is_loading());
        assert_eq!(gate.bootstrap().await, SessionState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_logout_signs_out_when_backend_is_unreachable() {
        let mut navigator = MockNavigator::new();
        navigator
            .expect_navigate()
            .withf(|path| path == LOGIN_ROUTE)
            .times(1)
            .return_const(());
        let gate = SessionGate::new(offline_client(true), Arc::new(navigator));

        let err = gate.logout().await.unwrap_err();
        assert!(matches!(err, SessionError::Client(ClientError::Request(_))));
        assert_eq!(gate.state(), SessionState::Unauthenticated);
        assert!(!gate.client().tokens().has_session());
    }

    #[test]
    fn test_profile_update_needs_a_session() {
        let gate = SessionGate::new(offline_client(false), Arc::new(MockNavigator::new()));
        assert!(matches!(
            gate.current_user(),
            Err(SessionError::NotAuthenticated)
        ));
    }
}
