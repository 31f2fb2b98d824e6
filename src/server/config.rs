use axum_extra::extract::cookie::Key;

use crate::error::Error;
use crate::gotrue::ProviderConfig;

const DEFAULT_APP_URL: &str = "https://www.jointhetempo.app/";

/// Settings shared by config and runtime state.
#[derive(Clone)]
pub(crate) struct ServerSettings {
    pub(crate) cookie_key: Key,
    pub(crate) session_cookie_name: String,
    pub(crate) session_ttl_minutes: i64,
    pub(crate) secure_cookies: bool,
    pub(crate) base_path: String,
    pub(crate) app_url: String,
    pub(crate) site_url: String,
}

impl ServerSettings {
    fn defaults() -> Self {
        Self {
            cookie_key: Key::generate(),
            session_cookie_name: "__tempo_recovery".into(),
            session_ttl_minutes: 60,
            secure_cookies: true,
            base_path: String::new(),
            app_url: DEFAULT_APP_URL.into(),
            site_url: DEFAULT_APP_URL.into(),
        }
    }

    /// Path the recovery cookie is scoped to.
    pub(crate) fn reset_path(&self) -> String {
        format!("{}/reset-password", self.base_path)
    }
}

/// Recovery routes configuration.
///
/// The provider configuration is optional on purpose: without it the routes
/// still serve, and report the "configuration missing" status.
pub struct RecoveryServerConfig {
    pub(super) provider: Option<ProviderConfig>,
    pub(super) settings: ServerSettings,
}

impl RecoveryServerConfig {
    #[must_use]
    pub fn new(provider: Option<ProviderConfig>) -> Self {
        Self {
            provider,
            settings: ServerSettings::defaults(),
        }
    }

    /// Create config from environment variables.
    ///
    /// # Env vars
    /// - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: identity provider (optional, see above)
    /// - `COOKIE_KEY`: cookie encryption key bytes (>= 64); ephemeral key if unset
    /// - `TEMPO_APP_URL`: target of the e-mail confirmation redirect
    /// - `TEMPO_SITE_URL`: marketing site, used for error redirects
    /// - `TEMPO_BASE_PATH`: prefix for every route
    /// - `TEMPO_INSECURE_COOKIES`: `"1"` or `"true"` drops the `Secure` flag (local dev)
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `COOKIE_KEY` is set but too short.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let provider = match ProviderConfig::from_vars(&lookup) {
            Ok(provider) => Some(provider),
            Err(e) => {
                tracing::error!(error = %e, "recovery routes start without identity provider");
                None
            }
        };

        let mut config = Self::new(provider);

        if let Some(k) = lookup("COOKIE_KEY") {
            let key = Key::try_from(k.as_bytes()).map_err(|_| {
                Error::Config(
                    "COOKIE_KEY is set but invalid (must be at least 64 bytes). \
                     Remove the env var to use an ephemeral key, or provide a valid key."
                        .into(),
                )
            })?;
            config = config.with_cookie_key(key);
        }
        if let Some(url) = lookup("TEMPO_APP_URL") {
            config = config.with_app_url(url);
        }
        if let Some(url) = lookup("TEMPO_SITE_URL") {
            config = config.with_site_url(url);
        }
        if let Some(path) = lookup("TEMPO_BASE_PATH") {
            config = config.with_base_path(path);
        }

        let insecure = matches!(
            lookup("TEMPO_INSECURE_COOKIES").as_deref(),
            Some("1") | Some("true"),
        );

        Ok(config.with_secure_cookies(!insecure))
    }

    #[must_use]
    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    #[must_use]
    pub fn with_cookie_key(mut self, key: Key) -> Self {
        self.settings.cookie_key = key;
        self
    }

    #[must_use]
    pub fn with_session_cookie_name(mut self, name: impl Into<String>) -> Self {
        self.settings.session_cookie_name = name.into();
        self
    }

    #[must_use]
    pub fn with_session_ttl_minutes(mut self, minutes: i64) -> Self {
        self.settings.session_ttl_minutes = minutes;
        self
    }

    #[must_use]
    pub fn with_secure_cookies(mut self, secure: bool) -> Self {
        self.settings.secure_cookies = secure;
        self
    }

    /// Prefix for every route; a trailing `/` is dropped.
    #[must_use]
    pub fn with_base_path(mut self, path: impl Into<String>) -> Self {
        self.settings.base_path = path.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_app_url(mut self, url: impl Into<String>) -> Self {
        self.settings.app_url = url.into();
        self
    }

    #[must_use]
    pub fn with_site_url(mut self, url: impl Into<String>) -> Self {
        self.settings.site_url = url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_provider_is_not_fatal() {
        let config = RecoveryServerConfig::from_vars(vars(&[])).unwrap();
        assert!(!config.has_provider());
        assert!(config.settings.secure_cookies);
        assert_eq!(config.settings.app_url, DEFAULT_APP_URL);
    }

    #[test]
    fn reads_provider_and_overrides() {
        let config = RecoveryServerConfig::from_vars(vars(&[
            ("SUPABASE_URL", "https://xyz.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
            ("TEMPO_APP_URL", "tempo://open"),
            ("TEMPO_BASE_PATH", "/account/"),
            ("TEMPO_INSECURE_COOKIES", "true"),
        ]))
        .unwrap();
        assert!(config.has_provider());
        assert_eq!(config.settings.app_url, "tempo://open");
        assert_eq!(config.settings.base_path, "/account");
        assert_eq!(config.settings.reset_path(), "/account/reset-password");
        assert!(!config.settings.secure_cookies);
    }

    #[test]
    fn short_cookie_key_is_rejected() {
        let result = RecoveryServerConfig::from_vars(vars(&[("COOKIE_KEY", "too-short")]));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn long_cookie_key_is_accepted() {
        let key = "k".repeat(64);
        let config = RecoveryServerConfig::from_vars(vars(&[("COOKIE_KEY", &key)])).unwrap();
        assert!(!config.has_provider());
    }
}
