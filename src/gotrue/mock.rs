//! Loopback stand-in for the hosted auth API, for tests.
//!
//! Token conventions:
//! - access token `expired` gets 401 from `GET /user`, `revoked` gets 403
//! - refresh token `used` is refused by the refresh grant
//! - code `abc123` can be exchanged once
//! - password `weakpass1` is refused by `PUT /user`
//! - logout with access token `gone` answers 404, `broken` answers an HTML 502

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde_json::{Value, json};
use url::Url;

use super::{GoTrueClient, ProviderConfig};

pub(crate) const ANON_KEY: &str = "anon-key";

/// One request as seen by the mock.
#[derive(Debug, Clone)]
pub(crate) struct Recorded {
    pub(crate) method: Method,
    pub(crate) path: String,
    pub(crate) query: Option<String>,
    pub(crate) apikey: Option<String>,
    pub(crate) bearer: Option<String>,
    pub(crate) body: Value,
}

#[derive(Default)]
struct Shared {
    requests: Mutex<Vec<Recorded>>,
    used_codes: Mutex<HashSet<String>>,
}

pub(crate) struct MockAuth {
    url: Url,
    shared: Arc<Shared>,
}

impl MockAuth {
    pub(crate) async fn start() -> Self {
        let shared = Arc::new(Shared::default());
        let app = Router::new()
            .fallback(handle)
            .with_state(Arc::clone(&shared));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{addr}").parse().unwrap(),
            shared,
        }
    }

    pub(crate) fn config(&self) -> ProviderConfig {
        ProviderConfig::new(self.url.clone(), ANON_KEY)
    }

    pub(crate) fn client(&self) -> GoTrueClient {
        GoTrueClient::new(self.config())
    }

    pub(crate) fn requests(&self) -> Vec<Recorded> {
        self.shared.requests.lock().unwrap().clone()
    }

    /// Requests matching `method` and a path under `/auth/v1/`.
    pub(crate) fn count(&self, method: &Method, path: &str) -> usize {
        let path = format!("/auth/v1/{path}");
        self.requests()
            .iter()
            .filter(|r| &r.method == method && r.path == path)
            .count()
    }
}

fn session_json(access: &str, refresh: &str) -> Value {
    json!({
        "access_token": access,
        "refresh_token": refresh,
        "token_type": "bearer",
        "expires_in": 3600,
        "user": { "id": "u-1", "email": "ada@example.com" },
    })
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, axum::Json(body)).into_response()
}

async fn handle(
    State(shared): State<Arc<Shared>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let header_value = |name: header::HeaderName| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
    };
    let recorded = Recorded {
        method: method.clone(),
        path: uri.path().to_owned(),
        query: uri.query().map(str::to_owned),
        apikey: header_value(header::HeaderName::from_static("apikey")),
        bearer: header_value(header::AUTHORIZATION)
            .and_then(|v| v.strip_prefix("Bearer ").map(str::to_owned)),
        body: serde_json::from_slice(&body).unwrap_or(Value::Null),
    };
    shared.requests.lock().unwrap().push(recorded.clone());

    let bearer = recorded.bearer.as_deref().unwrap_or_default();
    let field = |name: &str| recorded.body[name].as_str().unwrap_or_default().to_owned();

    match (method.as_str(), uri.path(), uri.query().unwrap_or_default()) {
        ("GET", "/auth/v1/user", _) => match bearer {
            "expired" => reply(StatusCode::UNAUTHORIZED, json!({ "msg": "JWT expired" })),
            "revoked" => reply(StatusCode::FORBIDDEN, json!({ "msg": "Session not found" })),
            _ => reply(StatusCode::OK, json!({ "id": "u-1", "email": "ada@example.com" })),
        },
        ("PUT", "/auth/v1/user", _) => {
            if field("password") == "weakpass1" {
                reply(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "code": 422, "error_code": "weak_password", "msg": "Password is known to be weak and easy to guess" }),
                )
            } else {
                reply(StatusCode::OK, json!({ "id": "u-1" }))
            }
        }
        ("POST", "/auth/v1/token", "grant_type=refresh_token") => {
            if field("refresh_token") == "used" {
                reply(
                    StatusCode::BAD_REQUEST,
                    json!({ "error": "invalid_grant", "error_description": "Invalid Refresh Token: Already Used" }),
                )
            } else {
                reply(StatusCode::OK, session_json("a-fresh", "r-fresh"))
            }
        }
        ("POST", "/auth/v1/token", "grant_type=pkce") => {
            let code = field("auth_code");
            let first_use = shared.used_codes.lock().unwrap().insert(code.clone());
            if code == "abc123" && first_use {
                reply(StatusCode::OK, session_json("a-code", "r-code"))
            } else {
                reply(
                    StatusCode::NOT_FOUND,
                    json!({ "code": 404, "error_code": "flow_state_not_found", "msg": "invalid flow state, no valid flow state found" }),
                )
            }
        }
        ("POST", "/auth/v1/logout", _) => match bearer {
            "gone" => reply(StatusCode::NOT_FOUND, json!({ "msg": "Session not found" })),
            "broken" => (StatusCode::BAD_GATEWAY, "<html><body>502 Bad Gateway</body></html>")
                .into_response(),
            _ => StatusCode::NO_CONTENT.into_response(),
        },
        ("POST", "/auth/v1/recover", _) => reply(StatusCode::OK, json!({})),
        _ => reply(StatusCode::NOT_FOUND, json!({ "msg": "no route" })),
    }
}
