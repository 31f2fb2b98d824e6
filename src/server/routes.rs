use axum::Router;
use axum::extract::{Json, Query, State};
use axum::response::Redirect;
use axum::routing::{get, post};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;
use url::Url;

use super::config::{RecoveryServerConfig, ServerSettings};
use super::cookies;
use super::state::{PendingUpdates, ServerState};
use super::types::{FlowResponse, UpdatePasswordRequest, VerifyLinkRequest};
use crate::flow::RecoveryFlow;
use crate::form::PasswordForm;
use crate::gotrue::{GoTrueClient, GoTrueProvider};
use crate::state::Phase;
use crate::types::RecoveryCredential;

/// Create the recovery router.
pub fn recovery_routes(config: RecoveryServerConfig) -> Router {
    let base_path = config.settings.base_path.clone();

    let state = ServerState {
        client: config.provider.map(GoTrueClient::new),
        settings: config.settings,
        updates: PendingUpdates::default(),
    };

    Router::new()
        .route(&format!("{base_path}/auth/callback"), get(email_confirmed))
        .route(
            &format!("{base_path}/reset-password/session"),
            post(verify_link),
        )
        .route(&format!("{base_path}/reset-password"), post(update_password))
        .with_state(state)
}

// ── E-mail confirmation ────────────────────────────────────────────

#[derive(Deserialize)]
struct CallbackParams {
    error: Option<String>,
    error_description: Option<String>,
}

async fn email_confirmed(
    State(state): State<ServerState>,
    Query(params): Query<CallbackParams>,
) -> Redirect {
    if let Some(error) = &params.error {
        let desc = params.error_description.as_deref().unwrap_or(error);
        tracing::warn!(error = %error, description = %desc, "e-mail confirmation failed");
        return Redirect::to(&error_redirect(&state.settings.site_url, desc));
    }

    tracing::info!("e-mail confirmed, sending user to the app");
    Redirect::to(&state.settings.app_url)
}

// ── Link check ─────────────────────────────────────────────────────

async fn verify_link(
    State(state): State<ServerState>,
    jar: PrivateCookieJar,
    Json(request): Json<VerifyLinkRequest>,
) -> (PrivateCookieJar, Json<FlowResponse>) {
    let mut flow = state.flow();

    let clean_url = match Url::parse(&request.url) {
        Ok(url) => Some(flow.load(&url).await.to_string()),
        Err(e) => {
            tracing::debug!(error = %e, "unparseable page URL, treating as no credential");
            flow.establish(&RecoveryCredential::None).await;
            None
        }
    };

    let jar = persist_session(jar, &state.settings, &flow);
    (jar, Json(FlowResponse::new(&flow, clean_url)))
}

// ── Password update ────────────────────────────────────────────────

async fn update_password(
    State(state): State<ServerState>,
    jar: PrivateCookieJar,
    Json(request): Json<UpdatePasswordRequest>,
) -> (PrivateCookieJar, Json<FlowResponse>) {
    let mut flow = state.flow();
    let stored = cookies::get_session(&jar, &state.settings.session_cookie_name);

    let Some(session) = stored.filter(|_| flow.phase() == Phase::Checking) else {
        flow.establish(&RecoveryCredential::None).await;
        let jar = persist_session(jar, &state.settings, &flow);
        return (jar, Json(FlowResponse::new(&flow, None)));
    };

    // Checked before the session is touched: re-validating it may rotate
    // the refresh token.
    let form = PasswordForm::new(request.password.as_str(), request.confirmation.as_str());
    if let Err(e) = form.validate() {
        tracing::debug!(error = %e, "password form rejected locally");
        return (jar, Json(FlowResponse::form_rejected(e)));
    }

    let Some(_claim) = state.updates.claim(&session.refresh_token) else {
        tracing::info!("password update already in flight for this recovery session");
        return (jar, Json(FlowResponse::update_in_progress()));
    };

    // Re-validate the stored pair; this also refreshes an expired access token.
    flow.establish(&RecoveryCredential::TokenPair {
        access_token: session.access_token,
        refresh_token: session.refresh_token,
    })
    .await;

    flow.set_password(request.password);
    flow.set_confirmation(request.confirmation);
    flow.submit().await;

    let jar = persist_session(jar, &state.settings, &flow);
    (jar, Json(FlowResponse::new(&flow, None)))
}

// ── Helpers ────────────────────────────────────────────────────────

/// Mirror the provider's session into the cookie, or drop the cookie.
fn persist_session(
    jar: PrivateCookieJar,
    settings: &ServerSettings,
    flow: &RecoveryFlow<GoTrueProvider>,
) -> PrivateCookieJar {
    let path = settings.reset_path();
    let cookie = flow
        .provider()
        .and_then(GoTrueProvider::session)
        .and_then(|session| {
            cookies::session_cookie(
                &settings.session_cookie_name,
                &session,
                &path,
                settings.session_ttl_minutes,
                settings.secure_cookies,
            )
        });

    match cookie {
        Some(cookie) => jar.add(cookie),
        None => jar.remove(cookies::clear_session_cookie(
            &settings.session_cookie_name,
            &path,
        )),
    }
}

fn error_redirect(site_url: &str, description: &str) -> String {
    let separator = if site_url.contains('?') { '&' } else { '?' };
    let encoded = urlencoding::encode(description);
    format!("{site_url}{separator}error={encoded}")
}
