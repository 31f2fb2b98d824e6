use url::Url;

use crate::error::Error;

pub const URL_VAR: &str = "SUPABASE_URL";
pub const ANON_KEY_VAR: &str = "SUPABASE_ANON_KEY";

/// Where the hosted auth service lives and the public key to call it with.
///
/// Both values are constructor parameters. [`from_env`](Self::from_env)
/// reports which one is missing instead of failing later on a request.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct ProviderConfig {
    pub(crate) url: Url,
    pub(crate) anon_key: String,
}

impl ProviderConfig {
    /// `url` is the project base URL (e.g. `https://xyz.supabase.co`); auth
    /// endpoints are resolved under `auth/v1/`.
    #[must_use]
    pub fn new(url: Url, anon_key: impl Into<String>) -> Self {
        Self {
            url,
            anon_key: anon_key.into(),
        }
    }

    /// Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY`. Empty values count as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] naming the first missing or malformed variable.
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let required = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| Error::Config(format!("{name} is required")))
        };

        let url_str = required(URL_VAR)?;
        let anon_key = required(ANON_KEY_VAR)?;

        let url: Url = url_str
            .parse()
            .map_err(|e| Error::Config(format!("{URL_VAR}: {e}")))?;
        if url.cannot_be_a_base() {
            return Err(Error::Config(format!("{URL_VAR}: not a base URL")));
        }

        Ok(Self::new(url, anon_key))
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn anon_key(&self) -> &str {
        &self.anon_key
    }

    /// Absolute URL of an auth endpoint, e.g. `endpoint("token")`.
    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, Error> {
        let mut url = self.url.clone();
        url.set_query(None);
        url.set_fragment(None);
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| Error::Config(format!("{}: not a base URL", self.url)))?;
            segments.pop_if_empty().extend(["auth", "v1", path]);
        }
        Ok(url)
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
    fn reads_both_values() {
        let config = ProviderConfig::from_vars(vars(&[
            (URL_VAR, "https://xyz.supabase.co"),
            (ANON_KEY_VAR, "anon-key"),
        ]))
        .unwrap();
        assert_eq!(config.url().as_str(), "https://xyz.supabase.co/");
        assert_eq!(config.anon_key(), "anon-key");
    }

    #[test]
    fn missing_url_is_named() {
        let err = ProviderConfig::from_vars(vars(&[(ANON_KEY_VAR, "anon-key")])).unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m == "SUPABASE_URL is required"));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let err = ProviderConfig::from_vars(vars(&[
            (URL_VAR, "https://xyz.supabase.co"),
            (ANON_KEY_VAR, "  "),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m == "SUPABASE_ANON_KEY is required"));
    }

    #[test]
    fn malformed_url_is_rejected() {
        let err = ProviderConfig::from_vars(vars(&[
            (URL_VAR, "not a url"),
            (ANON_KEY_VAR, "anon-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(ref m) if m.starts_with("SUPABASE_URL:")));

        let err = ProviderConfig::from_vars(vars(&[
            (URL_VAR, "mailto:auth@example.com"),
            (ANON_KEY_VAR, "anon-key"),
        ]))
        .unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn endpoints_live_under_auth_v1() {
        let config = ProviderConfig::new("https://xyz.supabase.co".parse().unwrap(), "k");
        assert_eq!(
            config.endpoint("token").unwrap().as_str(),
            "https://xyz.supabase.co/auth/v1/token"
        );

        let proxied = ProviderConfig::new("https://api.example.com/tempo/".parse().unwrap(), "k");
        assert_eq!(
            proxied.endpoint("user").unwrap().as_str(),
            "https://api.example.com/tempo/auth/v1/user"
        );
    }
}
