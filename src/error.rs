#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    #[error("Configuration missing: {0}")]
    Config(String),
    #[error("{operation} rejected by identity provider: {message}")]
    Provider {
        operation: &'static str,
        status: Option<u16>,
        message: String,
    },
    #[cfg(feature = "gotrue")]
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("No active session")]
    NoSession,
}

impl Error {
    /// Text shown to the user when this error ends the flow.
    ///
    /// Provider rejections carry their own message (e.g. a breached-password
    /// check); everything else falls back to the display text.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status returned by the provider, if the error came from one.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Provider { status, .. } => *status,
            #[cfg(feature = "gotrue")]
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
