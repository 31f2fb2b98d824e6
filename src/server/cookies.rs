use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::provider::Session;
use crate::types::{AccessToken, RefreshToken};

/// Token pair kept between the link check and the password submission.
#[derive(Serialize, Deserialize)]
struct StoredSession {
    access_token: AccessToken,
    refresh_token: RefreshToken,
}

/// Create the recovery session cookie (encrypted by the private jar).
pub(super) fn session_cookie(
    name: &str,
    session: &Session,
    path: &str,
    ttl_minutes: i64,
    secure: bool,
) -> Option<Cookie<'static>> {
    let stored = StoredSession {
        access_token: session.access_token.clone(),
        refresh_token: session.refresh_token.clone(),
    };
    let value = serde_json::to_string(&stored)
        .inspect_err(|e| tracing::error!(error = %e, "recovery session not serializable"))
        .ok()?;

    Some(
        Cookie::build((name.to_string(), value))
            .http_only(true)
            .secure(secure)
            .same_site(SameSite::Strict)
            .path(path.to_string())
            .max_age(Duration::minutes(ttl_minutes))
            .build(),
    )
}

/// Create removal cookie for the recovery session.
pub(super) fn clear_session_cookie(name: &str, path: &str) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .path(path.to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Get the recovery session from cookies.
pub(super) fn get_session(jar: &PrivateCookieJar, name: &str) -> Option<Session> {
    let cookie = jar.get(name)?;
    match serde_json::from_str::<StoredSession>(cookie.value()) {
        Ok(stored) => Some(Session::new(stored.access_token, stored.refresh_token)),
        Err(e) => {
            tracing::warn!(error = %e, "discarding malformed recovery cookie");
            None
        }
    }
}
