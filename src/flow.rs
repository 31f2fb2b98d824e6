use url::Url;

use crate::link;
use crate::provider::IdentityProvider;
use crate::state::{FormView, Phase, RecoveryState, SessionOutcome};
use crate::status::FlowStatus;
use crate::types::RecoveryCredential;

/// Password recovery for one page visit.
///
/// Owns the state machine and the identity provider it talks to. A flow
/// without a provider is the "configuration missing" dead end: it reports
/// the error status and never reaches the network.
pub struct RecoveryFlow<P> {
    provider: Option<P>,
    state: RecoveryState,
}

impl<P: IdentityProvider> RecoveryFlow<P> {
    #[must_use]
    pub fn new(provider: P) -> Self {
        Self {
            provider: Some(provider),
            state: RecoveryState::new(),
        }
    }

    /// Flow for a deployment missing its provider configuration.
    #[must_use]
    pub fn unconfigured() -> Self {
        let mut state = RecoveryState::new();
        state.config_missing();
        tracing::error!("identity provider not configured");
        Self {
            provider: None,
            state,
        }
    }

    #[must_use]
    pub fn provider(&self) -> Option<&P> {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn state(&self) -> &RecoveryState {
        &self.state
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.state.phase()
    }

    #[must_use]
    pub fn status(&self) -> Option<&FlowStatus> {
        self.state.status()
    }

    #[must_use]
    pub fn view(&self) -> FormView {
        self.state.view()
    }

    /// Interprets the page URL and establishes the recovery session.
    ///
    /// Returns the URL with the consumed credential removed; the caller
    /// should replace the current history entry with it so a reload does not
    /// replay stale tokens. The credential is cleared whether or not the
    /// provider accepts it.
    ///
    /// Only the first load of a flow talks to the provider; later calls
    /// return `url` untouched.
    pub async fn load(&mut self, url: &Url) -> Url {
        if self.provider.is_none() || self.phase() != Phase::Checking {
            return url.clone();
        }
        let credential = link::parse(url);
        let clean = link::strip_credentials(url, &credential);
        self.establish(&credential).await;
        clean
    }

    /// Runs the session check for an already parsed credential.
    ///
    /// Leaves the flow out of `Checking`. A flow whose session check
    /// already resolved is left as is, without provider calls.
    pub async fn establish(&mut self, credential: &RecoveryCredential) {
        let Some(provider) = self.provider.as_ref() else {
            return;
        };
        if self.state.phase() != Phase::Checking {
            tracing::debug!(phase = ?self.state.phase(), "session already resolved, link ignored");
            return;
        }
        self.state.link_parsed(credential);
        let outcome = resolve_session(provider, credential).await;
        self.state.session_resolved(outcome);
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.state.form_mut().set_password(password);
    }

    pub fn set_confirmation(&mut self, confirmation: impl Into<String>) {
        self.state.form_mut().set_confirmation(confirmation);
    }

    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.provider.is_some() && self.state.can_submit()
    }

    /// Submits the new password.
    ///
    /// Returns `false` without calling the provider when the form cannot be
    /// submitted. On success the recovery session is signed out exactly
    /// once; on failure it is kept so the user can retry.
    pub async fn submit(&mut self) -> bool {
        let Some(provider) = self.provider.as_ref() else {
            return false;
        };
        let Some(password) = self.state.submit_clicked() else {
            return false;
        };

        let result = match provider.update_password(&password).await {
            Ok(()) => {
                if let Err(e) = provider.sign_out().await {
                    tracing::warn!(error = %e, "sign-out after password update failed");
                }
                tracing::info!("password updated through recovery link");
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "password update rejected");
                Err(e.user_message())
            }
        };

        self.state.update_resolved(result);
        true
    }
}

async fn resolve_session<P: IdentityProvider>(
    provider: &P,
    credential: &RecoveryCredential,
) -> SessionOutcome {
    let exchanged = match credential {
        RecoveryCredential::TokenPair {
            access_token,
            refresh_token,
        } => provider.set_session(access_token, refresh_token).await,
        RecoveryCredential::ExchangeCode { code } => {
            provider.exchange_code_for_session(code).await
        }
        RecoveryCredential::None => return SessionOutcome::Absent,
    };

    if let Err(e) = exchanged {
        return SessionOutcome::Rejected(e.to_string());
    }

    // The exchange result alone is not trusted; ask for the live session.
    match provider.current_session().await {
        Ok(Some(session)) => {
            tracing::info!(
                user_id = ?session.user_id(),
                credential = credential.kind(),
                "recovery session established"
            );
            SessionOutcome::Established
        }
        Ok(None) => SessionOutcome::Absent,
        Err(e) => SessionOutcome::Rejected(e.to_string()),
    }
}
