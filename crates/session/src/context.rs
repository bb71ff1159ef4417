//! Process-wide session state

use medibook_core::types::{Role, User};
use medibook_http::SessionListener;
use tokio::sync::watch;

/// Who is using the client right now
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionState {
    /// The current-user lookup has not finished yet
    #[default]
    Unknown,
    Unauthenticated,
    Authenticated(Box<User>),
}

impl SessionState {
    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Authenticated(user) => Some(&**user),
            _ => None,
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|user| user.role)
    }

    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub const fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn reduce(&self, action: SessionAction) -> Self {
        match action {
            SessionAction::UserLoaded(user) => Self::Authenticated(Box::new(user)),
            SessionAction::ProfileUpdated(user) => match self {
                Self::Authenticated(_) => Self::Authenticated(Box::new(user)),
                other => other.clone(),
            },
            SessionAction::LoadFailed | SessionAction::LoggedOut | SessionAction::Expired => {
                Self::Unauthenticated
            }
        }
    }
}

/// Session context actions
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Current-user lookup or login succeeded
    UserLoaded(User),
    /// The account record changed while signed in
    ProfileUpdated(User),
    /// No stored token, or the lookup failed
    LoadFailed,
    LoggedOut,
    /// The refresh exchange failed
    Expired,
}

/// Shared session state with change notification
#[derive(Debug)]
pub struct SessionStore {
    state: watch::Sender<SessionState>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(SessionState::Unknown);
        Self { state }
    }

    pub fn state(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn dispatch(&self, action: SessionAction) {
        self.state.send_modify(|state| {
            let next = state.reduce(action);
            if *state != next {
                debug!(
                    from = discriminant_name(state),
                    to = discriminant_name(&next),
                    "Session state changed"
                );
            }
            *state = next;
        });
    }
}

impl SessionListener for SessionStore {
    fn session_expired(&self) {
        self.dispatch(SessionAction::Expired);
    }
}

const fn discriminant_name(state: &SessionState) -> &'static str {
    match state {
        SessionState::Unknown => "unknown",
        SessionState::Unauthenticated => "unauthenticated",
        SessionState::Authenticated(_) => "authenticated",
    }
}
