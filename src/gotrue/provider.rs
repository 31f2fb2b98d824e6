use std::sync::{Mutex, MutexGuard, PoisonError};

use super::client::GoTrueClient;
use crate::error::Error;
use crate::provider::{IdentityProvider, Session};
use crate::types::{AccessToken, AuthCode, RefreshToken};

/// [`IdentityProvider`] backed by the hosted auth service.
///
/// Holds the current session in memory, the way the browser SDK keeps it in
/// local storage: one provider per page visit (or per request on a server).
pub struct GoTrueProvider {
    client: GoTrueClient,
    session: Mutex<Option<Session>>,
    code_verifier: Option<String>,
}

impl GoTrueProvider {
    #[must_use]
    pub fn new(client: GoTrueClient) -> Self {
        Self {
            client,
            session: Mutex::new(None),
            code_verifier: None,
        }
    }

    /// Start from an already established session.
    #[must_use]
    pub fn with_session(self, session: Session) -> Self {
        *self.lock() = Some(session);
        self
    }

    /// PKCE verifier returned by
    /// [`GoTrueClient::request_recovery`](super::GoTrueClient::request_recovery),
    /// needed to exchange the link's code.
    #[must_use]
    pub fn with_code_verifier(mut self, verifier: impl Into<String>) -> Self {
        self.code_verifier = Some(verifier.into());
        self
    }

    #[must_use]
    pub fn client(&self) -> &GoTrueClient {
        &self.client
    }

    /// Snapshot of the session currently held.
    #[must_use]
    pub fn session(&self) -> Option<Session> {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, Option<Session>> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, session: Session) {
        *self.lock() = Some(session);
    }
}

/// 401/403 from the user endpoint: token expired or revoked.
fn is_auth_rejection(error: &Error) -> bool {
    matches!(error.status(), Some(401 | 403))
}

impl IdentityProvider for GoTrueProvider {
    async fn set_session(
        &self,
        access_token: &AccessToken,
        refresh_token: &RefreshToken,
    ) -> Result<Session, Error> {
        let session = match self.client.get_user(access_token).await {
            Ok(user) => Session::new(access_token.clone(), refresh_token.clone()).with_user(user),
            Err(e) if is_auth_rejection(&e) => {
                tracing::debug!(error = %e, "access token refused, refreshing recovery session");
                self.client.refresh_session(refresh_token).await?
            }
            Err(e) => return Err(e),
        };
        self.store(session.clone());
        Ok(session)
    }

    async fn exchange_code_for_session(&self, code: &AuthCode) -> Result<Session, Error> {
        let verifier = self.code_verifier.as_deref().unwrap_or_default();
        if verifier.is_empty() {
            tracing::debug!("exchanging recovery code without a stored PKCE verifier");
        }
        let session = self.client.exchange_code(code, verifier).await?;
        self.store(session.clone());
        Ok(session)
    }

    async fn current_session(&self) -> Result<Option<Session>, Error> {
        Ok(self.session())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), Error> {
        let access_token = self.session().map(|s| s.access_token).ok_or(Error::NoSession)?;
        let user = self.client.update_password(&access_token, new_password).await?;
        tracing::debug!(user_id = %user.id, "password update accepted");
        Ok(())
    }

    async fn sign_out(&self) -> Result<(), Error> {
        let taken = self.lock().take();
        let Some(session) = taken else {
            return Ok(());
        };
        match self.client.logout(&session.access_token).await {
            Ok(()) => Ok(()),
            // already gone server-side
            Err(e) if matches!(e.status(), Some(401 | 403 | 404)) => Ok(()),
            Err(e) => Err(e),
        }
    }
}
