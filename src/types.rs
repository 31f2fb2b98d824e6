use derive_more::{Display, From, Into};
use serde::{Deserialize, Serialize};

/// Declares a string newtype holding a credential.
///
/// `Debug` is redacted so credentials can travel through `tracing` fields
/// and test assertions without leaking.
macro_rules! secret_string {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize, From, Into)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[must_use]
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Debug for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!(stringify!($name), "(***)"))
            }
        }
    };
}

secret_string! {
    /// Short-lived bearer token issued by the identity provider.
    AccessToken
}

secret_string! {
    /// Long-lived token used to mint a new access token.
    RefreshToken
}

secret_string! {
    /// Single-use PKCE authorization code from a recovery link.
    AuthCode
}

/// Identity provider user identifier (UUID string).
///
/// Safe to log; this is the only user attribute the flow ever records.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, From, Into)]
#[serde(transparent)]
pub struct UserId(pub String);

/// What a recovery link carried.
///
/// Built once per page load by [`link::parse`](crate::link::parse) and consumed
/// by the session establisher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecoveryCredential {
    /// Token pair from the URL fragment (implicit flow).
    TokenPair {
        access_token: AccessToken,
        refresh_token: RefreshToken,
    },
    /// PKCE code from the query string.
    ExchangeCode { code: AuthCode },
    /// Nothing usable in the URL.
    None,
}

impl RecoveryCredential {
    /// Short label for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::TokenPair { .. } => "token_pair",
            Self::ExchangeCode { .. } => "exchange_code",
            Self::None => "none",
        }
    }
}
