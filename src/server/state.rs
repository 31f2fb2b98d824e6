use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use axum::extract::FromRef;
use axum_extra::extract::cookie::Key;

use super::config::ServerSettings;
use crate::flow::RecoveryFlow;
use crate::gotrue::{GoTrueClient, GoTrueProvider};
use crate::types::RefreshToken;

/// Shared state for recovery route handlers.
#[derive(Clone)]
pub(super) struct ServerState {
    pub(super) client: Option<GoTrueClient>,
    pub(super) settings: ServerSettings,
    pub(super) updates: PendingUpdates,
}

impl ServerState {
    /// A fresh flow for one request; each request gets its own provider
    /// session so nothing leaks between visitors.
    pub(super) fn flow(&self) -> RecoveryFlow<GoTrueProvider> {
        match &self.client {
            Some(client) => RecoveryFlow::new(GoTrueProvider::new(client.clone())),
            None => RecoveryFlow::unconfigured(),
        }
    }
}

// PrivateCookieJar requires Key to be extractable from state
impl FromRef<ServerState> for Key {
    fn from_ref(state: &ServerState) -> Self {
        state.settings.cookie_key.clone()
    }
}

/// Recovery sessions with a password update in flight, keyed by the
/// refresh token stored in their cookie.
#[derive(Clone, Default)]
pub(super) struct PendingUpdates(Arc<Mutex<HashSet<String>>>);

impl PendingUpdates {
    /// Claims the session for one update. `None` while another request
    /// holds it.
    pub(super) fn claim(&self, refresh_token: &RefreshToken) -> Option<UpdateClaim> {
        let key = refresh_token.as_str().to_owned();
        if !self.lock().insert(key.clone()) {
            return None;
        }
        Some(UpdateClaim {
            pending: self.clone(),
            key,
        })
    }

    fn lock(&self) -> MutexGuard<'_, HashSet<String>> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the claim when the update request finishes.
pub(super) struct UpdateClaim {
    pending: PendingUpdates,
    key: String,
}

impl Drop for UpdateClaim {
    fn drop(&mut self) {
        self.pending.lock().remove(&self.key);
    }
}
