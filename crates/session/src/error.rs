//! Session error types

use medibook_http::ClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The operation needs a signed-in user
    #[error("Not signed in")]
    NotAuthenticated,
}

impl SessionError {
    pub fn user_message(&self) -> String {
        match self {
            Self::Client(err) => err.user_message(),
            Self::NotAuthenticated => "Please sign in to continue".to_string(),
        }
    }
}

pub type SessionResult<T> = Result<T, SessionError>;
