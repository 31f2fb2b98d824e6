use reqwest::Method;
use serde::Deserialize;
use serde_json::json;
use url::Url;

use super::config::ProviderConfig;
use crate::error::Error;
use crate::pkce;
use crate::provider::{Session, User};
use crate::types::{AccessToken, AuthCode, RefreshToken};

/// Stateless client for the hosted auth REST API.
///
/// Every call sends the project's public key in the `apikey` header. Calls
/// made on behalf of a user carry that user's access token as bearer.
#[derive(Debug, Clone)]
pub struct GoTrueClient {
    config: ProviderConfig,
    http: reqwest::Client,
}

impl GoTrueClient {
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Fetch the user behind an access token; fails if the token is no
    /// longer accepted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Provider`]
    /// if the token is rejected.
    pub async fn get_user(&self, access_token: &AccessToken) -> Result<User, Error> {
        let response = self
            .request(Method::GET, "user", Some(access_token))?
            .send()
            .await?;
        let response = Self::ensure_success(response, "session check").await?;
        response.json::<User>().await.map_err(Into::into)
    }

    /// Mint a new session from a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Provider`]
    /// if the refresh token is invalid, expired or already used.
    pub async fn refresh_session(&self, refresh_token: &RefreshToken) -> Result<Session, Error> {
        let response = self
            .request(Method::POST, "token", None)?
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }))
            .send()
            .await?;
        let response = Self::ensure_success(response, "session refresh").await?;
        response.json::<Session>().await.map_err(Into::into)
    }

    /// Exchange a PKCE code from a recovery link for a session.
    ///
    /// The service consumes the code; a second exchange fails.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Provider`]
    /// if the code is unknown, used, expired or the verifier does not match.
    pub async fn exchange_code(
        &self,
        code: &AuthCode,
        code_verifier: &str,
    ) -> Result<Session, Error> {
        let response = self
            .request(Method::POST, "token", None)?
            .query(&[("grant_type", "pkce")])
            .json(&json!({
                "auth_code": code,
                "code_verifier": code_verifier,
            }))
            .send()
            .await?;
        let response = Self::ensure_success(response, "code exchange").await?;
        response.json::<Session>().await.map_err(Into::into)
    }

    /// Set a new password for the user owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Provider`]
    /// carrying the service's message when the password is refused (same
    /// as the old one, too weak, found in a breach corpus, ...).
    pub async fn update_password(
        &self,
        access_token: &AccessToken,
        new_password: &str,
    ) -> Result<User, Error> {
        let response = self
            .request(Method::PUT, "user", Some(access_token))?
            .json(&json!({ "password": new_password }))
            .send()
            .await?;
        let response = Self::ensure_success(response, "password update").await?;
        response.json::<User>().await.map_err(Into::into)
    }

    /// Revoke every session of the user owning `access_token`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Provider`]
    /// if the service refuses the request.
    pub async fn logout(&self, access_token: &AccessToken) -> Result<(), Error> {
        let response = self
            .request(Method::POST, "logout", Some(access_token))?
            .query(&[("scope", "global")])
            .send()
            .await?;
        Self::ensure_success(response, "sign out").await?;
        Ok(())
    }

    /// Ask the service to e-mail a recovery link to `email`.
    ///
    /// A fresh PKCE challenge is sent with the request; the returned code
    /// verifier is needed later to exchange the link's code (see
    /// [`GoTrueProvider::with_code_verifier`](super::GoTrueProvider::with_code_verifier)).
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] on network failure, or [`Error::Provider`]
    /// if the service refuses the request (rate limit, invalid address).
    pub async fn request_recovery(
        &self,
        email: &str,
        redirect_to: Option<&Url>,
    ) -> Result<String, Error> {
        let code_verifier = pkce::generate_code_verifier();
        let code_challenge = pkce::generate_code_challenge(&code_verifier);

        let mut request = self.request(Method::POST, "recover", None)?;
        if let Some(redirect_to) = redirect_to {
            request = request.query(&[("redirect_to", redirect_to.as_str())]);
        }

        let response = request
            .json(&json!({
                "email": email,
                "code_challenge": code_challenge,
                "code_challenge_method": pkce::CHALLENGE_METHOD,
            }))
            .send()
            .await?;
        Self::ensure_success(response, "recovery request").await?;

        tracing::info!("recovery e-mail requested");
        Ok(code_verifier)
    }

    fn request(
        &self,
        method: Method,
        path: &str,
        access_token: Option<&AccessToken>,
    ) -> Result<reqwest::RequestBuilder, Error> {
        let url = self.config.endpoint(path)?;
        let bearer = access_token.map_or(self.config.anon_key(), AccessToken::as_str);
        Ok(self
            .http
            .request(method, url)
            .header("apikey", self.config.anon_key())
            .bearer_auth(bearer))
    }

    /// Checks HTTP response status; returns the response on success or an error with details.
    async fn ensure_success(
        response: reqwest::Response,
        operation: &'static str,
    ) -> Result<reqwest::Response, Error> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(operation, status, "identity provider rejected request");
        Err(Error::Provider {
            operation,
            status: Some(status),
            message: provider_message(&body, status),
        })
    }
}

/// Error body shapes returned by the auth service across versions.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    msg: Option<String>,
    message: Option<String>,
    error_description: Option<String>,
    error: Option<String>,
}

fn provider_message(body: &str, status: u16) -> String {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    [
        parsed.msg,
        parsed.message,
        parsed.error_description,
        parsed.error,
    ]
    .into_iter()
    .flatten()
    .map(|m| m.trim().to_string())
    .find(|m| !m.is_empty())
    .or_else(|| plain_message(body))
    .unwrap_or_else(|| format!("HTTP {status}"))
}

/// A short one-line text body, as some proxies send. Markup, JSON and
/// anything long is not shown to users.
fn plain_message(body: &str) -> Option<String> {
    const MAX_CHARS: usize = 200;
    let raw = body.trim();
    let plain = !raw.is_empty()
        && !raw.contains('\n')
        && !raw.starts_with(['{', '[', '<'])
        && raw.chars().count() <= MAX_CHARS;
    plain.then(|| raw.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gotrue::mock::{ANON_KEY, MockAuth};

    #[test]
    fn message_from_current_error_shape() {
        let body = r#"{"code":422,"error_code":"same_password","msg":"New password should be different from the old password."}"#;
        assert_eq!(
            provider_message(body, 422),
            "New password should be different from the old password."
        );
    }

    #[test]
    fn message_from_oauth_error_shape() {
        let body = r#"{"error":"invalid_grant","error_description":"Invalid Refresh Token: Already Used"}"#;
        assert_eq!(
            provider_message(body, 400),
            "Invalid Refresh Token: Already Used"
        );
    }

    #[test]
    fn message_from_gateway_shape() {
        let body = r#"{"message":"Invalid API key"}"#;
        assert_eq!(provider_message(body, 401), "Invalid API key");
    }

    #[test]
    fn message_falls_back_to_plain_body_or_status() {
        assert_eq!(provider_message("upstream timeout", 504), "upstream timeout");
        assert_eq!(provider_message("", 502), "HTTP 502");
        assert_eq!(provider_message(r#"{"code":500}"#, 500), "HTTP 500");
    }

    #[test]
    fn markup_and_long_bodies_are_not_shown() {
        let html = "<html>\n<head><title>502 Bad Gateway</title></head>\n</html>";
        assert_eq!(provider_message(html, 502), "HTTP 502");
        assert_eq!(provider_message(&"x".repeat(201), 503), "HTTP 503");
        assert_eq!(provider_message(&"x".repeat(200), 503), "x".repeat(200));
    }

    #[tokio::test]
    async fn recovery_request_sends_pkce_challenge() {
        let mock = MockAuth::start().await;
        let redirect: Url = "https://t.app/reset".parse().unwrap();

        let verifier = mock
            .client()
            .request_recovery("ada@example.com", Some(&redirect))
            .await
            .unwrap();

        let requests = mock.requests();
        let recover = &requests[0];
        assert_eq!(recover.path, "/auth/v1/recover");
        assert_eq!(
            recover.query.as_deref(),
            Some("redirect_to=https%3A%2F%2Ft.app%2Freset")
        );
        assert_eq!(recover.apikey.as_deref(), Some(ANON_KEY));
        assert_eq!(recover.body["email"], "ada@example.com");
        assert_eq!(
            recover.body["code_challenge"],
            pkce::generate_code_challenge(&verifier)
        );
        assert_eq!(recover.body["code_challenge_method"], pkce::CHALLENGE_METHOD);
    }

    #[test]
    fn client_keeps_config() {
        let config = ProviderConfig::new("https://xyz.supabase.co".parse().unwrap(), "anon");
        let client = GoTrueClient::new(config).with_http_client(reqwest::Client::new());
        assert_eq!(client.config().anon_key(), "anon");
    }
}
