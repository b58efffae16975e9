//! Token-holding session provider.

use std::sync::Mutex;

use async_trait::async_trait;

use albamate_core::{BookmarkError, BookmarkResult, SessionProvider};

/// A [`SessionProvider`] over a bearer token held in memory.
///
/// Token issuance and renewal transport belong to the external session
/// layer; this type only models what the synchronizer needs: presence of a
/// session, a refresh precondition, and sign-out. Refresh succeeds as long
/// as a token is held — a deployment with a real renewal endpoint would
/// swap in its own `SessionProvider`.
pub struct StaticSession {
    token: Mutex<Option<String>>,
}

impl StaticSession {
    /// An authenticated session over a fixed token.
    #[must_use]
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    /// A guest session.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            token: Mutex::new(None),
        }
    }

    /// Current token, if the session is live.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.token.lock().expect("session mutex poisoned").clone()
    }
}

#[async_trait]
impl SessionProvider for StaticSession {
    async fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    async fn refresh(&self) -> BookmarkResult<()> {
        if self.token().is_some() {
            Ok(())
        } else {
            Err(BookmarkError::Unauthenticated {
                reason: "no session token held".to_string(),
            })
        }
    }

    async fn sign_out(&self) {
        self.token.lock().expect("session mutex poisoned").take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_out_drops_the_token() {
        let session = StaticSession::with_token("token-123");
        assert!(session.is_authenticated().await);
        session.refresh().await.expect("refresh succeeds");

        session.sign_out().await;
        assert!(!session.is_authenticated().await);
        assert!(session.refresh().await.is_err());
    }

    #[tokio::test]
    async fn guest_session_never_refreshes() {
        let session = StaticSession::guest();
        assert!(!session.is_authenticated().await);
        let error = session.refresh().await.expect_err("refresh must fail");
        assert!(error.is_unauthenticated());
    }
}
