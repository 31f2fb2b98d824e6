//! Axum routes hosting the recovery flow.
//!
//! The reset page posts its full URL (fragment included, which never reaches
//! a server on its own) and later the new password; the recovery session
//! travels between the two calls in an encrypted cookie.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use tempo_accounts::server::{RecoveryServerConfig, recovery_routes};
//!
//! // Missing SUPABASE_* variables do not fail here: the routes answer with
//! // the "configuration missing" status instead.
//! let config = RecoveryServerConfig::from_env()?;
//!
//! let app = axum::Router::new().merge(recovery_routes(config));
//! ```
//!
//! # Routes
//!
//! | Method | Path                            | Body                             |
//! |--------|---------------------------------|----------------------------------|
//! | GET    | `{base}/auth/callback`          | none                             |
//! | POST   | `{base}/reset-password/session` | `{"url": "<page URL>"}`          |
//! | POST   | `{base}/reset-password`         | `{"password", "confirmation"}`   |
//!
//! A submitted password is validated before the stored session is touched,
//! and only one submission per recovery session reaches the provider at a
//! time; a concurrent one gets the "update in progress" status back.

mod config;
mod cookies;
mod routes;
mod state;
mod types;

pub use config::RecoveryServerConfig;
pub use routes::recovery_routes;
pub use types::{FlowResponse, UpdatePasswordRequest, VerifyLinkRequest};

/// Re-export cookie key type for builder API.
pub use axum_extra::extract::cookie::Key as CookieKey;
