//! Explicit session context for the API client.
//!
//! The bearer token lives here rather than in ambient global state. The
//! client reads it per request and clears it when the backend answers 401;
//! deciding where to send the user afterwards is left to the caller.

use std::sync::Arc;

use tokio::sync::RwLock;

/// Path of the login view.
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    user: Option<String>,
}

/// Shared, cloneable session handle.
#[derive(Debug, Clone, Default)]
pub struct Session {
    inner: Arc<RwLock<SessionState>>,
}

impl Session {
    /// A signed-out session.
    pub fn new() -> Self {
        Self::default()
    }

    /// A session that starts with a token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionState {
                token: Some(token.into()),
                user: None,
            })),
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.token.clone()
    }

    pub async fn user(&self) -> Option<String> {
        self.inner.read().await.user.clone()
    }

    pub async fn is_signed_in(&self) -> bool {
        self.inner.read().await.token.is_some()
    }

    /// Store credentials issued by the identity provider.
    pub async fn sign_in(&self, token: impl Into<String>, user: Option<String>) {
        let mut guard = self.inner.write().await;
        guard.token = Some(token.into());
        guard.user = user;
    }

    /// Drop the token and user.
    ///
    /// Returns `true` if there was a token to drop, so concurrent 401s tear
    /// the session down once.
    pub async fn expire(&self) -> bool {
        let mut guard = self.inner.write().await;
        guard.user = None;
        guard.token.take().is_some()
    }
}

/// Where to send the user after a 401, if anywhere.
///
/// Returns `None` when the current view already is the login view.
pub fn login_redirect(current_path: &str) -> Option<&'static str> {
    let path = current_path.split(['?', '#']).next().unwrap_or_default();
    if path.trim_end_matches('/') == LOGIN_PATH {
        None
    } else {
        Some(LOGIN_PATH)
    }
}
