//! Deduplicated access-token refresh
//!
//! At most one refresh exchange runs at a time. Every request that fails with
//! 401 while an exchange is outstanding awaits that same exchange and sees the
//! same outcome.

use super::token_store::TokenStore;
use futures::future::{BoxFuture, FutureExt, Shared};
use medibook_core::types::{ApiResponse, AuthTokens, RefreshResponse};
use reqwest::Client;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use url::Url;

/// Notified when the session can no longer be refreshed
pub trait SessionListener: Send + Sync {
    fn session_expired(&self);
}

/// Why a refresh exchange failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    #[error("no refresh token is stored")]
    MissingRefreshToken,

    #[error("refresh request failed: {0}")]
    Transport(String),

    #[error("refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    #[error("malformed refresh response: {0}")]
    Malformed(String),

    #[error("could not persist refreshed tokens: {0}")]
    Storage(String),
}

type RefreshFuture = Shared<BoxFuture<'static, Result<String, RefreshError>>>;

/// Everything an exchange needs, owned so the shared future is `'static`
#[derive(Clone)]
pub(crate) struct RefreshExchange {
    pub(crate) http: Client,
    pub(crate) url: Url,
    pub(crate) tokens: TokenStore,
    pub(crate) listener: Option<Arc<dyn SessionListener>>,
}

impl RefreshExchange {
    async fn run(self) -> Result<String, RefreshError> {
        let outcome = self.request_tokens().await.and_then(|tokens| {
            self.tokens
                .store(&tokens)
                .map_err(|err| RefreshError::Storage(err.to_string()))?;
            Ok(tokens.access_token)
        });

        match &outcome {
            Ok(_) => info!("Session refreshed"),
            Err(err) => {
                warn!(error = %err, "Session refresh failed, signing out");
                if let Err(err) = self.tokens.clear() {
                    warn!(error = %err, "Failed to clear stored tokens");
                }
                if let Some(listener) = &self.listener {
                    listener.session_expired();
                }
            }
        }

        outcome
    }

    async fn request_tokens(&self) -> Result<AuthTokens, RefreshError> {
        let refresh_token = self
            .tokens
            .refresh_token()
            .ok_or(RefreshError::MissingRefreshToken)?;

        debug!(url = %self.url, "Exchanging refresh token");
        let response = self
            .http
            .post(self.url.clone())
            .bearer_auth(refresh_token)
            .json(&serde_json::json!({}))
            .send()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| RefreshError::Transport(err.to_string()))?;

        if !status.is_success() {
            return Err(RefreshError::Rejected {
                status: status.as_u16(),
                message: super::error::message_from_body(&body),
            });
        }

        let envelope: ApiResponse<RefreshResponse> = serde_json::from_slice(&body)
            .map_err(|err| RefreshError::Malformed(err.to_string()))?;
        let tokens = envelope
            .into_data()
            .map_err(|err| RefreshError::Malformed(err.to_string()))?
            .tokens;

        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(RefreshError::Malformed("empty token in response".into()));
        }
        Ok(tokens)
    }
}

/// Single-flight marker for refresh exchanges
#[derive(Default)]
pub(crate) struct RefreshGuard {
    in_flight: Mutex<Option<RefreshFuture>>,
}

impl RefreshGuard {
    /// Resolve a fresh access token for a request that was rejected while
    /// carrying `rejected_token`.
    ///
    /// If another caller already committed a different token it is returned
    /// without a new exchange. A request rejected after an earlier exchange
    /// failed and wiped the tokens fails without notifying the listener
    /// again. Otherwise the caller joins the outstanding exchange or starts
    /// one.
    pub(crate) async fn refresh(
        &self,
        exchange: RefreshExchange,
        rejected_token: Option<&str>,
    ) -> Result<String, RefreshError> {
        let pending = {
            let mut slot = self.in_flight.lock().await;

            if let Some(current) = exchange.tokens.access_token()
                && Some(current.as_str()) != rejected_token
            {
                debug!("Reusing access token committed by a concurrent refresh");
                return Ok(current);
            }

            if slot.is_none()
                && rejected_token.is_some()
                && exchange.tokens.access_token().is_none()
                && exchange.tokens.refresh_token().is_none()
            {
                debug!("Session already signed out by an earlier refresh");
                return Err(RefreshError::MissingRefreshToken);
            }

            if let Some(pending) = slot.as_ref() {
                debug!("Joining in-flight session refresh");
                pending.clone()
            } else {
                let pending = exchange.run().boxed().shared();
                *slot = Some(pending.clone());
                pending
            }
        };

        let outcome = pending.clone().await;

        let mut slot = self.in_flight.lock().await;
        if slot
            .as_ref()
            .is_some_and(|current| current.ptr_eq(&pending))
        {
            *slot = None;
        }

        outcome
    }
}
