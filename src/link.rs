//! Recovery link interpretation.
//!
//! Parsing is pure: [`parse`] never touches the URL. Clearing the consumed
//! credential from the address bar is a separate step, [`strip_credentials`],
//! which the caller sequences after parsing (typically by replacing the
//! current history entry with the returned URL).

use url::Url;
use url::form_urlencoded;

use crate::types::{AccessToken, AuthCode, RecoveryCredential, RefreshToken};

const ACCESS_TOKEN_PARAM: &str = "access_token";
const REFRESH_TOKEN_PARAM: &str = "refresh_token";
const CODE_PARAM: &str = "code";

/// Extracts the recovery credential carried by `url`.
///
/// Fragment tokens take priority over a query `code`. Empty values count as
/// absent.
#[must_use]
pub fn parse(url: &Url) -> RecoveryCredential {
    if let Some(credential) = fragment_tokens(url) {
        return credential;
    }

    match query_value(url, CODE_PARAM) {
        Some(code) => RecoveryCredential::ExchangeCode {
            code: AuthCode::new(code),
        },
        None => RecoveryCredential::None,
    }
}

/// Returns `url` without the parts that carried `credential`.
///
/// - `TokenPair`: the fragment is dropped, and a `code` query parameter too
///   if one came along.
/// - `ExchangeCode`: only the `code` parameter is dropped; other query
///   pairs and the fragment are kept.
/// - `None`: unchanged.
#[must_use]
pub fn strip_credentials(url: &Url, credential: &RecoveryCredential) -> Url {
    let mut clean = url.clone();
    match credential {
        RecoveryCredential::TokenPair { .. } => {
            clean.set_fragment(None);
            remove_query_param(&mut clean, CODE_PARAM);
        }
        RecoveryCredential::ExchangeCode { .. } => {
            remove_query_param(&mut clean, CODE_PARAM);
        }
        RecoveryCredential::None => {}
    }
    clean
}

fn fragment_tokens(url: &Url) -> Option<RecoveryCredential> {
    let fragment = url.fragment()?;
    let mut access_token = None;
    let mut refresh_token = None;
    let mut has_access_param = false;

    for (key, value) in form_urlencoded::parse(fragment.as_bytes()) {
        match &*key {
            ACCESS_TOKEN_PARAM => {
                has_access_param = true;
                if access_token.is_none() && !value.is_empty() {
                    access_token = Some(value.into_owned());
                }
            }
            REFRESH_TOKEN_PARAM => {
                if refresh_token.is_none() && !value.is_empty() {
                    refresh_token = Some(value.into_owned());
                }
            }
            _ => {}
        }
    }

    if !has_access_param {
        return None;
    }

    match (access_token, refresh_token) {
        (Some(access), Some(refresh)) => Some(RecoveryCredential::TokenPair {
            access_token: AccessToken::new(access),
            refresh_token: RefreshToken::new(refresh),
        }),
        _ => {
            tracing::debug!("recovery fragment without a complete token pair");
            None
        }
    }
}

fn query_value(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, value)| key == name && !value.is_empty())
        .map(|(_, value)| value.into_owned())
}

fn remove_query_param(url: &mut Url, name: &str) {
    if url.query().is_none() {
        return;
    }

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(key, _)| key != name)
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }
}
