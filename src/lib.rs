#![doc = include_str!("../README.md")]

pub mod error;
pub mod flow;
pub mod form;
#[cfg(feature = "gotrue")]
pub mod gotrue;
pub mod link;
#[cfg(feature = "gotrue")]
pub mod pkce;
pub mod provider;
#[cfg(feature = "server")]
pub mod server;
pub mod state;
pub mod status;
pub mod types;

// Re-exports for convenient access
pub use error::Error;
pub use flow::RecoveryFlow;
pub use form::{FormError, MIN_PASSWORD_LENGTH, PasswordForm, PasswordHint};
#[cfg(feature = "gotrue")]
pub use gotrue::{GoTrueClient, GoTrueProvider, ProviderConfig};
pub use provider::{IdentityProvider, Session, User};
pub use state::{FormView, Phase, RecoveryState, SessionOutcome};
pub use status::{FlowStatus, StatusKind};
pub use types::{AccessToken, AuthCode, RecoveryCredential, RefreshToken, UserId};
