use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::types::{AccessToken, AuthCode, RefreshToken, UserId};

/// Authenticated session issued by the identity provider.
///
/// The recovery flow only cares whether one exists; the tokens are kept so a
/// provider can authorize the password update and the sign-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct Session {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub user: Option<User>,
}

fn default_token_type() -> String {
    "bearer".into()
}

impl Session {
    /// Session from a bare token pair, without provider metadata.
    #[must_use]
    pub fn new(access_token: AccessToken, refresh_token: RefreshToken) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: default_token_type(),
            expires_in: None,
            user: None,
        }
    }

    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = Some(user);
        self
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&UserId> {
        self.user.as_ref().map(|u| &u.id)
    }
}

/// Identity provider user record (only the fields this crate reads).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[non_exhaustive]
pub struct User {
    pub id: UserId,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: UserId(id.into()),
            email: None,
        }
    }

    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Capabilities the recovery flow needs from the hosted identity service.
///
/// Passed to [`RecoveryFlow::new`](crate::RecoveryFlow::new) so tests and
/// alternative backends can substitute their own implementation.
///
/// # Example
///
/// ```rust,ignore
/// impl IdentityProvider for MyBackend {
///     async fn set_session(&self, access: &AccessToken, refresh: &RefreshToken)
///         -> Result<Session, Error> { ... }
///     async fn exchange_code_for_session(&self, code: &AuthCode)
///         -> Result<Session, Error> { ... }
///     async fn current_session(&self) -> Result<Option<Session>, Error> { ... }
///     async fn update_password(&self, new_password: &str) -> Result<(), Error> { ... }
///     async fn sign_out(&self) -> Result<(), Error> { ... }
/// }
/// ```
pub trait IdentityProvider: Send + Sync {
    /// Adopt a session from a token pair found in a recovery link.
    fn set_session(
        &self,
        access_token: &AccessToken,
        refresh_token: &RefreshToken,
    ) -> impl Future<Output = Result<Session, Error>> + Send;

    /// Trade a single-use PKCE code for a session. Replays must fail.
    fn exchange_code_for_session(
        &self,
        code: &AuthCode,
    ) -> impl Future<Output = Result<Session, Error>> + Send;

    /// Session currently held, if any.
    fn current_session(&self) -> impl Future<Output = Result<Option<Session>, Error>> + Send;

    /// Set a new password for the user of the current session.
    fn update_password(
        &self,
        new_password: &str,
    ) -> impl Future<Output = Result<(), Error>> + Send;

    /// End the current session.
    fn sign_out(&self) -> impl Future<Output = Result<(), Error>> + Send;
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_from_provider_json() {
        let json = r#"{
            "access_token": "eyJ.a.b",
            "token_type": "bearer",
            "expires_in": 3600,
            "expires_at": 1760000000,
            "refresh_token": "r-1",
            "user": { "id": "6f1c0b6e-0000-4000-8000-000000000000", "email": "ana@example.com", "role": "authenticated" }
        }"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert_eq!(session.access_token.as_str(), "eyJ.a.b");
        assert_eq!(session.expires_in, Some(3600));
        assert_eq!(
            session.user_id().map(ToString::to_string).as_deref(),
            Some("6f1c0b6e-0000-4000-8000-000000000000")
        );
    }

    #[test]
    fn session_defaults_when_metadata_missing() {
        let session: Session =
            serde_json::from_str(r#"{"access_token":"a","refresh_token":"r"}"#).unwrap();
        assert_eq!(session.token_type, "bearer");
        assert!(session.user.is_none());
        assert_eq!(session, Session::new(AccessToken::new("a"), RefreshToken::new("r")));
    }
}
